//! Class-like declaration scanner.
//!
//! Walks a PHP token stream with a small state machine and extracts one
//! [`DeclarationRecord`] per named class, interface, trait or enum
//! declaration: its fully-qualified name, the resolved `extends` parent,
//! the resolved `implements` list and the traits used in its body.
//!
//! # States
//!
//! - **Seeking**: looking for `namespace`, `class`, `interface`, `trait`
//!   or `enum` at a declaration site.
//! - **NamespaceName**: reading the namespace path up to `;` or `{`.
//! - **ClassHeader**: expecting the declared identifier.  Anything else
//!   (`new class (...)`, `new class {`) is an anonymous class and produces
//!   no record.
//! - **InheritanceClause**: reading `extends` / `implements` (and an enum's
//!   backing type) until the body opens.
//! - **ClassBody**: walking the body to its matching `}` and collecting
//!   trait-use statements at depth 1.  Interfaces skip this state.
//!
//! The scanner never fails.  Structurally odd input at worst drops the
//! declaration it belongs to, and every step moves the cursor forward.

use tracing::trace;

use crate::cursor::Cursor;
use crate::imports::ImportTable;
use crate::lexer::tokenize;
use crate::resolve::resolve_name;
use crate::token::{Token, TokenKind};
use crate::types::{DeclarationKind, DeclarationRecord};

/// Tokenize `source` and scan it with alias-aware name resolution.
pub fn scan_source(source: &str, file: &str) -> Vec<DeclarationRecord> {
    scan_declarations(&tokenize(source), file)
}

/// Scan a token stream, building its import table first.
pub fn scan_declarations(tokens: &[Token<'_>], file: &str) -> Vec<DeclarationRecord> {
    let imports = ImportTable::build(tokens);
    scan_declarations_with(tokens, file, &imports)
}

/// Scan a token stream resolving names against the given import table.
///
/// Pass `&ImportTable::default()` for plain, non-alias-aware resolution.
pub fn scan_declarations_with(
    tokens: &[Token<'_>],
    file: &str,
    imports: &ImportTable,
) -> Vec<DeclarationRecord> {
    let mut scanner = Scanner {
        cur: Cursor::new(tokens),
        file,
        imports,
        namespace: String::new(),
        last: None,
        records: Vec::new(),
    };
    scanner.run();
    scanner.records
}

enum State {
    Seeking,
    NamespaceName,
    ClassHeader(DeclarationKind),
    InheritanceClause(Pending),
    ClassBody(Pending),
}

/// A declaration whose identifier has been read but whose record has not
/// been emitted yet.
struct Pending {
    kind: DeclarationKind,
    short_name: String,
    parent: Option<String>,
    interfaces: Vec<String>,
    traits: Vec<String>,
}

struct Scanner<'a, 't, 'src> {
    cur: Cursor<'t, 'src>,
    file: &'a str,
    imports: &'a ImportTable,
    namespace: String,
    /// Last significant token consumed while seeking.
    last: Option<Token<'src>>,
    records: Vec<DeclarationRecord>,
}

impl<'a, 't, 'src> Scanner<'a, 't, 'src> {
    fn run(&mut self) {
        let mut state = State::Seeking;
        loop {
            state = match state {
                State::Seeking => match self.seek() {
                    Some(next) => next,
                    None => break,
                },
                State::NamespaceName => self.namespace_name(),
                State::ClassHeader(kind) => self.class_header(kind),
                State::InheritanceClause(pending) => self.inheritance_clause(pending),
                State::ClassBody(pending) => self.class_body(pending),
            };
            if matches!(state, State::Seeking) {
                self.last = None;
            }
        }
    }

    fn seek(&mut self) -> Option<State> {
        while let Some(tok) = self.cur.advance() {
            let after_member_access = self
                .last
                .replace(tok)
                .is_some_and(|prev| matches!(prev.text, "::" | "->" | "?->"));
            if after_member_access {
                // `Foo::class`, `$node->interface`
                continue;
            }

            match tok.kind {
                TokenKind::Namespace => {
                    if self.cur.peek().is_some_and(|t| t.opens_namespace()) {
                        return Some(State::NamespaceName);
                    }
                }
                TokenKind::Class => return Some(State::ClassHeader(DeclarationKind::Class)),
                TokenKind::Interface => {
                    return Some(State::ClassHeader(DeclarationKind::Interface));
                }
                TokenKind::Trait => return Some(State::ClassHeader(DeclarationKind::Trait)),
                TokenKind::Name
                    if tok.text.eq_ignore_ascii_case("enum")
                        && self.cur.peek().is_some_and(|t| t.kind == TokenKind::Name) =>
                {
                    return Some(State::ClassHeader(DeclarationKind::Enum));
                }
                _ => {}
            }
        }
        None
    }

    fn namespace_name(&mut self) -> State {
        match self.cur.collect_name() {
            Some(name) => self.namespace = name.trim_start_matches('\\').to_string(),
            // `namespace { ... }` declares the global namespace.
            None if self.cur.at_symbol('{') => self.namespace.clear(),
            None => {
                trace!(file = self.file, "namespace keyword without a name");
                return State::Seeking;
            }
        }
        if !self.cur.eat_symbol(';') {
            self.cur.eat_symbol('{');
        }
        State::Seeking
    }

    fn class_header(&mut self, kind: DeclarationKind) -> State {
        match self.cur.peek() {
            Some(tok) if tok.kind == TokenKind::Name => {
                self.cur.advance();
                State::InheritanceClause(Pending {
                    kind,
                    short_name: tok.text.to_string(),
                    parent: None,
                    interfaces: Vec::new(),
                    traits: Vec::new(),
                })
            }
            other => {
                trace!(
                    file = self.file,
                    next = ?other.map(|t| t.text),
                    "skipping anonymous or malformed declaration"
                );
                State::Seeking
            }
        }
    }

    fn inheritance_clause(&mut self, mut pending: Pending) -> State {
        while let Some(tok) = self.cur.peek() {
            match tok.kind {
                TokenKind::Extends => {
                    self.cur.advance();
                    if let Some(raw) = self.cur.collect_name()
                        && pending.parent.is_none()
                    {
                        pending.parent = self.resolve(&raw);
                    }
                    // Interfaces may extend several interfaces; only the
                    // first is recorded.
                    while self.cur.eat_symbol(',') {
                        self.cur.collect_name();
                    }
                }
                TokenKind::Implements => {
                    self.cur.advance();
                    pending.interfaces.extend(self.name_list());
                }
                TokenKind::Symbol(':') if pending.kind == DeclarationKind::Enum => {
                    // Backed enum type (`enum Suit: string`).
                    self.cur.advance();
                    self.cur.collect_name();
                }
                TokenKind::Symbol('{') => {
                    self.cur.advance();
                    if pending.kind.uses_traits() {
                        return State::ClassBody(pending);
                    }
                    self.emit(pending);
                    return State::Seeking;
                }
                TokenKind::Symbol(';') | TokenKind::Symbol('}') => {
                    trace!(
                        file = self.file,
                        name = pending.short_name.as_str(),
                        "declaration header without a body"
                    );
                    return State::Seeking;
                }
                _ => {
                    self.cur.advance();
                }
            }
        }

        // Input ended inside the header: keep what was read.
        self.emit(pending);
        State::Seeking
    }

    fn class_body(&mut self, mut pending: Pending) -> State {
        let mut depth = 1usize;
        while let Some(tok) = self.cur.advance() {
            match tok.kind {
                TokenKind::Symbol('{') => depth += 1,
                TokenKind::Symbol('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Use if depth == 1 => {
                    pending.traits.extend(self.name_list());
                    // `use A, B { A::x insteadof B; }` adaptation block.
                    if self.cur.at_symbol('{') {
                        self.cur.skip_balanced();
                    } else {
                        self.cur.eat_symbol(';');
                    }
                }
                _ => {}
            }
        }

        self.emit(pending);
        State::Seeking
    }

    /// Collect a comma-separated list of names, resolving each one.
    fn name_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        loop {
            if let Some(raw) = self.cur.collect_name()
                && let Some(fqn) = self.resolve(&raw)
            {
                names.push(fqn);
            }
            if !self.cur.eat_symbol(',') {
                break;
            }
        }
        names
    }

    fn resolve(&self, raw: &str) -> Option<String> {
        resolve_name(raw, &self.namespace, self.imports)
    }

    fn emit(&mut self, pending: Pending) {
        let fqcn = if self.namespace.is_empty() {
            pending.short_name.clone()
        } else {
            format!("{}\\{}", self.namespace, pending.short_name)
        };
        self.records.push(DeclarationRecord {
            fqcn,
            file: self.file.to_string(),
            namespace: self.namespace.clone(),
            short_name: pending.short_name,
            parent: pending.parent,
            interfaces: pending.interfaces,
            traits: pending.traits,
            kind: pending.kind,
        });
    }
}
