//! Token model consumed by the import builder and the declaration scanner.
//!
//! Only the handful of keyword kinds the scanner actually consults get their
//! own variant.  Everything else collapses into [`TokenKind::Symbol`] (for
//! single-character punctuation) or [`TokenKind::Other`].

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Namespace,
    Class,
    Interface,
    Trait,
    Extends,
    Implements,
    /// `use`, both as an import statement and as an in-body trait use.
    Use,
    As,
    Final,
    Abstract,
    Readonly,
    Function,
    Const,
    New,
    /// A bare identifier fragment (`Foo`, `enum`, `string`, ...).
    Name,
    /// The namespace separator `\`.
    Separator,
    /// A `$variable`.
    Variable,
    Whitespace,
    Comment,
    /// Text outside `<?php ... ?>` tags, including the tags themselves.
    InlineHtml,
    /// Single-character punctuation such as `{`, `}`, `;`, `,`, `(`, `)`.
    Symbol(char),
    /// Literals, multi-character operators and anything unrecognised.
    Other,
}

/// A single token with the source text it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Byte offset of the token in the source unit.
    pub offset: u32,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, offset: u32) -> Self {
        Self { kind, text, offset }
    }

    /// Whitespace, comments and inline HTML carry no structure.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::InlineHtml
        )
    }

    pub fn is_symbol(&self, c: char) -> bool {
        self.kind == TokenKind::Symbol(c)
    }

    /// Whether this token, following `namespace`, makes it a declaration.
    ///
    /// `namespace Foo;` and `namespace {` declare; `namespace\foo()`,
    /// `f(namespace: $x)` and `function namespace()` do not.
    pub fn opens_namespace(&self) -> bool {
        self.kind == TokenKind::Name || self.is_symbol('{')
    }

    /// Tokens that may appear inside a qualified name.
    pub fn is_name_part(&self) -> bool {
        matches!(self.kind, TokenKind::Name | TokenKind::Separator)
    }
}

/// Classify an identifier as one of the keywords the scanner cares about.
///
/// PHP keywords are case-insensitive, so `CLASS` and `Class` both classify
/// as [`TokenKind::Class`].  Soft keywords such as `enum` stay [`TokenKind::Name`];
/// the scanner decides from context whether they start a declaration.
pub fn keyword_kind(ident: &str) -> TokenKind {
    // Longest keyword we classify is "implements".
    if ident.len() > 10 {
        return TokenKind::Name;
    }
    match ident.to_ascii_lowercase().as_str() {
        "namespace" => TokenKind::Namespace,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "trait" => TokenKind::Trait,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "use" => TokenKind::Use,
        "as" => TokenKind::As,
        "final" => TokenKind::Final,
        "abstract" => TokenKind::Abstract,
        "readonly" => TokenKind::Readonly,
        "function" => TokenKind::Function,
        "const" => TokenKind::Const,
        "new" => TokenKind::New,
        _ => TokenKind::Name,
    }
}
