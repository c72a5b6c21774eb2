//! Forward-only read cursor over a token slice.
//!
//! Shared by the import-table builder and the declaration scanner.  Every
//! method either leaves the position untouched or moves it forward, which
//! is what bounds scanning time by the token count.

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'t, 'src> {
    tokens: &'t [Token<'src>],
    pos: usize,
}

impl<'t, 'src> Cursor<'t, 'src> {
    pub(crate) fn new(tokens: &'t [Token<'src>]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    fn skip_trivia(&mut self) {
        while self.tokens.get(self.pos).is_some_and(Token::is_trivia) {
            self.pos += 1;
        }
    }

    /// The next significant token, without consuming it.
    pub(crate) fn peek(&mut self) -> Option<Token<'src>> {
        self.skip_trivia();
        self.tokens.get(self.pos).copied()
    }

    /// The significant token after [`peek`](Self::peek), without consuming
    /// anything.
    pub(crate) fn peek_second(&mut self) -> Option<Token<'src>> {
        self.skip_trivia();
        self.tokens
            .get(self.pos + 1..)?
            .iter()
            .find(|t| !t.is_trivia())
            .copied()
    }

    /// Consume and return the next significant token.
    pub(crate) fn advance(&mut self) -> Option<Token<'src>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    /// Consume the next significant token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_symbol(&mut self, c: char) -> bool {
        self.eat(TokenKind::Symbol(c))
    }

    pub(crate) fn at_symbol(&mut self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_symbol(c))
    }

    /// Collect a (possibly qualified) name made of consecutive name
    /// fragments and separators, skipping interleaved trivia.
    ///
    /// Stops at the first token that cannot continue the name (`,`, `{`,
    /// `;`, `)`, a keyword after a fragment, ...).  Keywords are accepted as
    /// segments after a separator (`App\Interface\Foo`), and a leading
    /// `namespace\` relative operator is kept verbatim for the resolver.
    ///
    /// Returns `None` when nothing was collected.
    pub(crate) fn collect_name(&mut self) -> Option<String> {
        let mut name = String::new();
        let mut after_separator = false;

        if self.peek().is_some_and(|t| t.kind == TokenKind::Namespace)
            && self
                .peek_second()
                .is_some_and(|t| t.kind == TokenKind::Separator)
        {
            if let Some(tok) = self.advance() {
                name.push_str(tok.text);
            }
        }

        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Separator => {
                    name.push('\\');
                    after_separator = true;
                }
                TokenKind::Name if name.is_empty() || after_separator => {
                    name.push_str(tok.text);
                    after_separator = false;
                }
                _ if after_separator && is_keyword(tok.kind) => {
                    name.push_str(tok.text);
                    after_separator = false;
                }
                _ => break,
            }
            self.pos += 1;
        }

        if name.is_empty() { None } else { Some(name) }
    }

    /// Skip a `{ ... }` region as a balanced unit.
    ///
    /// Expects the next significant token to be `{`; does nothing otherwise.
    /// An unterminated region runs to the end of the tokens.
    pub(crate) fn skip_balanced(&mut self) {
        if !self.eat_symbol('{') {
            return;
        }
        let mut depth = 1usize;
        while let Some(tok) = self.advance() {
            match tok.kind {
                TokenKind::Symbol('{') => depth += 1,
                TokenKind::Symbol('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip to just past the next `;` at the current nesting level.
    ///
    /// Balanced `{ ... }` regions on the way are skipped whole.  Stops
    /// without consuming at an unmatched `}` so the enclosing block stays
    /// intact.
    pub(crate) fn skip_statement(&mut self) {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Symbol(';') => {
                    self.pos += 1;
                    return;
                }
                TokenKind::Symbol('{') => self.skip_balanced(),
                TokenKind::Symbol('}') => return,
                _ => self.pos += 1,
            }
        }
    }
}

fn is_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Namespace
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Trait
            | TokenKind::Extends
            | TokenKind::Implements
            | TokenKind::Use
            | TokenKind::As
            | TokenKind::Final
            | TokenKind::Abstract
            | TokenKind::Readonly
            | TokenKind::Function
            | TokenKind::Const
            | TokenKind::New
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_collect_qualified_name() {
        let toks = tokenize("<?php \\App\\Models\\User {");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.collect_name().as_deref(), Some("\\App\\Models\\User"));
        assert!(cur.at_symbol('{'));
    }

    #[test]
    fn test_collect_name_skips_trivia_between_parts() {
        let toks = tokenize("<?php App /* c */ \\ Base ,");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.collect_name().as_deref(), Some("App\\Base"));
        assert!(cur.at_symbol(','));
    }

    #[test]
    fn test_collect_name_accepts_keyword_segments() {
        let toks = tokenize("<?php App\\Interface\\Foo implements");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.collect_name().as_deref(), Some("App\\Interface\\Foo"));
        assert_eq!(cur.peek().map(|t| t.kind), Some(TokenKind::Implements));
    }

    #[test]
    fn test_collect_name_stops_before_keyword_after_fragment() {
        let toks = tokenize("<?php Foo extends Bar");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.collect_name().as_deref(), Some("Foo"));
        assert_eq!(cur.peek().map(|t| t.kind), Some(TokenKind::Extends));
    }

    #[test]
    fn test_collect_namespace_relative_name() {
        let toks = tokenize("<?php namespace\\Sub\\Base {");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.collect_name().as_deref(), Some("namespace\\Sub\\Base"));
    }

    #[test]
    fn test_collect_name_returns_none_without_name() {
        let toks = tokenize("<?php ($x)");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.collect_name(), None);
        assert!(cur.at_symbol('('));
    }

    #[test]
    fn test_skip_balanced_nested() {
        let toks = tokenize("<?php { a { b } { c } } tail");
        let mut cur = Cursor::new(&toks);
        cur.skip_balanced();
        assert_eq!(cur.advance().map(|t| t.text), Some("tail"));
    }

    #[test]
    fn test_skip_balanced_unterminated_reaches_end() {
        let toks = tokenize("<?php { a { b }");
        let mut cur = Cursor::new(&toks);
        cur.skip_balanced();
        assert!(cur.is_at_end());
    }

    #[test]
    fn test_skip_statement_stops_at_enclosing_brace() {
        let toks = tokenize("<?php a b } c");
        let mut cur = Cursor::new(&toks);
        cur.skip_statement();
        assert!(cur.at_symbol('}'));

        let toks = tokenize("<?php a { ; } b; c");
        let mut cur = Cursor::new(&toks);
        cur.skip_statement();
        assert_eq!(cur.advance().map(|t| t.text), Some("c"));
    }
}
