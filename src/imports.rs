//! `use` import table construction.
//!
//! Builds the per-file mapping of short (imported) names to their
//! fully-qualified equivalents from the top-level `use` statements of a
//! token stream.
//!
//! Handles:
//! - simple imports: `use Foo\Bar;` → `Bar => Foo\Bar`
//! - aliases: `use Foo\Bar as Baz;` → `Baz => Foo\Bar`
//! - comma lists: `use Foo\Bar, Qux\Quux;`
//! - group imports: `use Foo\{Bar, Baz as Q};` → `Bar => Foo\Bar`, `Q => Foo\Baz`
//!
//! `use function` / `use const` imports (and typed members of a mixed
//! group) are not class imports and are skipped.

use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use crate::util::short_name;

/// Alias → fully-qualified name mapping for one source unit.
///
/// Lookups are ASCII case-insensitive, like PHP class names.  Values never
/// carry a leading separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    /// Keyed by the lowercased alias; values keep the original alias casing
    /// next to the fully-qualified name.
    entries: HashMap<String, (String, String)>,
}

impl ImportTable {
    /// Scan a token stream once and collect every top-level class import.
    ///
    /// Imports are only honoured outside class and function bodies; braces
    /// opened by a braced namespace declaration (`namespace Foo { ... }`)
    /// do not count as nesting.  Never fails: anything that does not look
    /// like an import (a closure's `use ($x)`, a truncated statement) is
    /// skipped.
    pub fn build(tokens: &[Token<'_>]) -> Self {
        let mut table = ImportTable::default();
        let mut cur = Cursor::new(tokens);
        // One entry per open brace; `true` for braces opened by a namespace.
        let mut braces: Vec<bool> = Vec::new();
        let mut in_namespace_header = false;

        while let Some(tok) = cur.advance() {
            match tok.kind {
                TokenKind::Symbol('{') => {
                    braces.push(in_namespace_header);
                    in_namespace_header = false;
                }
                TokenKind::Symbol('}') => {
                    braces.pop();
                }
                TokenKind::Symbol(';') => in_namespace_header = false,
                TokenKind::Namespace => {
                    in_namespace_header = cur.peek().is_some_and(|t| t.opens_namespace());
                }
                TokenKind::Use if braces.iter().all(|ns| *ns) => {
                    table.parse_use_statement(&mut cur);
                }
                _ => {}
            }
        }

        table
    }

    /// Parse one `use` statement.  The cursor sits just after the keyword.
    fn parse_use_statement(&mut self, cur: &mut Cursor<'_, '_>) {
        if cur
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Function | TokenKind::Const))
        {
            cur.skip_statement();
            return;
        }

        loop {
            let Some(base) = cur.collect_name() else {
                // Closure `use (...)` or garbage: leave the tokens for the
                // main loop.
                return;
            };

            if cur.at_symbol('{') {
                self.parse_group(cur, &base);
            } else {
                let fqn = base.trim_start_matches('\\');
                let alias = if cur.eat(TokenKind::As) {
                    cur.collect_name()
                } else {
                    None
                };
                let alias = alias.unwrap_or_else(|| short_name(fqn).to_string());
                self.insert(&alias, fqn);
            }

            if !cur.eat_symbol(',') {
                break;
            }
        }

        cur.skip_statement();
    }

    /// Parse `{A, B\C, D as E}` after a group prefix.
    fn parse_group(&mut self, cur: &mut Cursor<'_, '_>, prefix: &str) {
        cur.eat_symbol('{');
        let prefix = prefix.trim_start_matches('\\').trim_end_matches('\\');

        while let Some(tok) = cur.peek() {
            match tok.kind {
                TokenKind::Symbol('}') => {
                    cur.advance();
                    return;
                }
                TokenKind::Symbol(',') => {
                    cur.advance();
                }
                TokenKind::Function | TokenKind::Const => {
                    // Typed member of a mixed group: consume its name and
                    // any alias without registering it.
                    cur.advance();
                    cur.collect_name();
                    if cur.eat(TokenKind::As) {
                        cur.advance();
                    }
                }
                TokenKind::Name | TokenKind::Separator => {
                    let Some(member) = cur.collect_name() else {
                        cur.advance();
                        continue;
                    };
                    let member = member.trim_start_matches('\\');
                    let fqn = if prefix.is_empty() {
                        member.to_string()
                    } else {
                        format!("{}\\{}", prefix, member)
                    };
                    let alias = if cur.eat(TokenKind::As) {
                        cur.collect_name()
                    } else {
                        None
                    };
                    let alias = alias.unwrap_or_else(|| short_name(&fqn).to_string());
                    self.insert(&alias, &fqn);
                }
                // `;` means the group was never closed.
                TokenKind::Symbol(';') => return,
                _ => {
                    cur.advance();
                }
            }
        }
    }

    /// Register `alias => fqn`.  Later imports of the same alias win.
    pub fn insert(&mut self, alias: &str, fqn: &str) {
        if alias.is_empty() || fqn.is_empty() {
            return;
        }
        self.entries.insert(
            alias.to_ascii_lowercase(),
            (alias.to_string(), fqn.trim_start_matches('\\').to_string()),
        );
    }

    /// Look up the fully-qualified name imported under `alias`.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries
            .get(&alias.to_ascii_lowercase())
            .map(|(_, fqn)| fqn.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(alias, fqn)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(alias, fqn)| (alias.as_str(), fqn.as_str()))
    }
}

impl<A: AsRef<str>, F: AsRef<str>> FromIterator<(A, F)> for ImportTable {
    fn from_iter<I: IntoIterator<Item = (A, F)>>(iter: I) -> Self {
        let mut table = ImportTable::default();
        for (alias, fqn) in iter {
            table.insert(alias.as_ref(), fqn.as_ref());
        }
        table
    }
}
