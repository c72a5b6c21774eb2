//! Logos-based PHP tokenizer.
//!
//! Produces the flat token stream the scanner walks.  The lexer only needs
//! to be precise about the things that could otherwise be mistaken for
//! structure: strings, comments, heredocs and inline HTML are each swallowed
//! as a single opaque token so that a `{` or `class` inside them never
//! reaches the scanner.
//!
//! PHP source starts in HTML mode.  [`tokenize`] alternates between copying
//! inline HTML verbatim and running the logos lexer over the code between an
//! opening tag and the next `?>`.

use logos::Logos;
use memchr::memmem;

use crate::token::{Token, TokenKind, keyword_kind};

/// Tokenize a complete PHP source unit.
///
/// Never fails: bytes the lexer does not recognise become
/// [`TokenKind::Other`] tokens and scanning carries on after them.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut offset = 0usize;

    loop {
        // ── HTML mode ───────────────────────────────────────────────────
        let rest = &source[offset..];
        let Some((start, tag_len)) = find_open_tag(rest) else {
            if !rest.is_empty() {
                tokens.push(Token::new(TokenKind::InlineHtml, rest, offset as u32));
            }
            break;
        };
        let html_end = start + tag_len;
        tokens.push(Token::new(
            TokenKind::InlineHtml,
            &rest[..html_end],
            offset as u32,
        ));
        offset += html_end;

        // ── Code mode ───────────────────────────────────────────────────
        let code = &source[offset..];
        let mut lex = RawToken::lexer(code);
        let mut closed = false;
        while let Some(raw) = lex.next() {
            let text = lex.slice();
            let at = (offset + lex.span().start) as u32;
            let kind = match raw {
                Ok(RawToken::CloseTag) => {
                    closed = true;
                    // `?>` terminates a statement just like `;`.
                    TokenKind::Symbol(';')
                }
                Ok(raw) => raw.kind(text),
                Err(()) => TokenKind::Other,
            };
            tokens.push(Token::new(kind, text, at));
            if closed {
                offset += lex.span().end;
                break;
            }
        }
        if !closed {
            break;
        }
    }

    tokens
}

/// Find the next `<?php` or `<?=` opening tag.
///
/// Bare `<?` short tags are not recognised, so `<?xml ... ?>` prologues in
/// templates stay inline HTML.  Returns the byte position of the tag and
/// its length.
fn find_open_tag(html: &str) -> Option<(usize, usize)> {
    let bytes = html.as_bytes();
    for start in memmem::find_iter(bytes, b"<?") {
        let after = &bytes[start + 2..];
        if after.len() >= 3 && after[..3].eq_ignore_ascii_case(b"php") {
            // `<?php` must be followed by whitespace or end of input.
            match after.get(3) {
                None => return Some((start, 5)),
                Some(b) if b.is_ascii_whitespace() => return Some((start, 6)),
                Some(_) => {}
            }
        }
        if after.first() == Some(&b'=') {
            return Some((start, 3));
        }
    }
    None
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    #[token("//", line_comment)]
    #[token("#", line_comment)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Ident,

    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable,

    #[regex(r"[0-9][0-9a-zA-Z_]*")]
    Number,

    #[token("'", single_quoted)]
    #[token("\"", double_quoted)]
    #[token("`", backtick_quoted)]
    String,

    #[token("<<<", heredoc)]
    Heredoc,

    #[token("\\")]
    Separator,

    #[token("?>")]
    CloseTag,

    #[token("::")]
    #[token("->")]
    #[token("?->")]
    #[token("=>")]
    #[token("#[")]
    Operator,

    #[regex(r"[^\sa-zA-Z0-9_\x{80}-\x{10FFFF}]", priority = 0)]
    Punct,
}

impl RawToken {
    fn kind(self, text: &str) -> TokenKind {
        match self {
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::LineComment | RawToken::BlockComment => TokenKind::Comment,
            RawToken::Ident => keyword_kind(text),
            RawToken::Variable => TokenKind::Variable,
            RawToken::Separator => TokenKind::Separator,
            RawToken::Punct => text
                .chars()
                .next()
                .map_or(TokenKind::Other, TokenKind::Symbol),
            RawToken::CloseTag => TokenKind::Symbol(';'),
            RawToken::Number | RawToken::String | RawToken::Heredoc | RawToken::Operator => {
                TokenKind::Other
            }
        }
    }
}

// ─── Callbacks ──────────────────────────────────────────────────────────────

/// A `//` or `#` comment runs to the end of the line or to a `?>` tag,
/// whichever comes first.
fn line_comment(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let newline = memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
    let close = memmem::find(&rest[..newline], b"?>").unwrap_or(newline);
    lex.bump(close);
    true
}

fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let end = memmem::find(rest, b"*/").map_or(rest.len(), |i| i + 2);
    lex.bump(end);
    true
}

fn single_quoted(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    bump_quoted(lex, b'\'');
    true
}

fn double_quoted(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    bump_quoted(lex, b'"');
    true
}

fn backtick_quoted(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    bump_quoted(lex, b'`');
    true
}

/// Advance past the closing `quote`, honouring backslash escapes.  An
/// unterminated string swallows the rest of the input.
fn bump_quoted(lex: &mut logos::Lexer<'_, RawToken>, quote: u8) {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while let Some(pos) = memchr::memchr2(b'\\', quote, &rest[i..]) {
        let at = i + pos;
        if rest[at] == b'\\' {
            i = at + 2;
            if i >= rest.len() {
                lex.bump(rest.len());
                return;
            }
        } else {
            lex.bump(at + 1);
            return;
        }
    }
    lex.bump(rest.len());
}

/// Swallow a heredoc or nowdoc body up to and including its closing label.
///
/// When the text after `<<<` is not a valid heredoc opener the token is
/// just the three `<` characters.
fn heredoc(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let Some((label, body_start)) = heredoc_label(rest) else {
        return true;
    };

    let mut line_start = body_start;
    while line_start < rest.len() {
        let line_end = memchr::memchr(b'\n', &rest[line_start..])
            .map_or(rest.len(), |i| line_start + i);
        let line = &rest[line_start..line_end];
        let indent = line
            .iter()
            .take_while(|b| **b == b' ' || **b == b'\t')
            .count();
        let candidate = &line[indent..];
        if candidate.starts_with(label)
            && !candidate
                .get(label.len())
                .is_some_and(|b| is_ident_byte(*b))
        {
            lex.bump(line_start + indent + label.len());
            return true;
        }
        line_start = line_end + 1;
    }

    lex.bump(rest.len());
    true
}

/// Parse `<<<LABEL`, `<<<"LABEL"` or `<<<'LABEL'` followed by a newline.
/// Returns the label and the offset of the first body byte.
fn heredoc_label(rest: &[u8]) -> Option<(&[u8], usize)> {
    let mut i = rest
        .iter()
        .take_while(|b| **b == b' ' || **b == b'\t')
        .count();
    let quote = match rest.get(i) {
        Some(q @ (b'"' | b'\'')) => {
            i += 1;
            Some(*q)
        }
        _ => None,
    };
    let label_start = i;
    while rest.get(i).is_some_and(|b| is_ident_byte(*b)) {
        i += 1;
    }
    if i == label_start || rest[label_start].is_ascii_digit() {
        return None;
    }
    let label = &rest[label_start..i];
    if let Some(q) = quote {
        if rest.get(i) != Some(&q) {
            return None;
        }
        i += 1;
    }
    if rest.get(i) == Some(&b'\r') {
        i += 1;
    }
    if rest.get(i) != Some(&b'\n') {
        return None;
    }
    Some((label, i + 1))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_class_header_tokens() {
        let toks = significant("<?php\nfinal class Foo extends \\App\\Base {}");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Final, "final"),
                (TokenKind::Class, "class"),
                (TokenKind::Name, "Foo"),
                (TokenKind::Extends, "extends"),
                (TokenKind::Separator, "\\"),
                (TokenKind::Name, "App"),
                (TokenKind::Separator, "\\"),
                (TokenKind::Name, "Base"),
                (TokenKind::Symbol('{'), "{"),
                (TokenKind::Symbol('}'), "}"),
            ]
        );
    }

    #[test]
    fn test_strings_and_comments_are_opaque() {
        let src = concat!(
            "<?php\n",
            "$a = 'class Fake {';\n",
            "$b = \"interface \\\" { $x }\";\n",
            "// class Commented {\n",
            "# class Hashed {\n",
            "/* class Blocked { */\n",
        );
        let toks = tokenize(src);
        assert!(
            !toks.iter().any(|t| matches!(
                t.kind,
                TokenKind::Class | TokenKind::Interface | TokenKind::Symbol('{')
            )),
            "no structural tokens expected, got {:?}",
            toks
        );
    }

    #[test]
    fn test_heredoc_and_nowdoc_are_opaque() {
        let src = concat!(
            "<?php\n",
            "$a = <<<EOT\n",
            "class Fake {\n",
            "EOT;\n",
            "$b = <<<'RAW'\n",
            "    interface Fake {\n",
            "    RAW;\n",
            "class Real {}\n",
        );
        let names: Vec<&str> = tokenize(src)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.text)
            .collect();
        assert_eq!(names, vec!["Real"]);
    }

    #[test]
    fn test_inline_html_mode_switching() {
        let src = "<html><?php class A {} ?><p>class B {}</p><?php class C {}";
        let names: Vec<&str> = tokenize(src)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.text)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_xml_prologue_is_not_an_open_tag() {
        let src = "<?xml version=\"1.0\"?>\n<root>class A {}</root>\n<?= $title ?><?php class B {}";
        let names: Vec<&str> = tokenize(src)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.text)
            .collect();
        assert_eq!(names, vec!["B"]);
        assert!(tokenize("<?xml version=\"1.0\"?>").iter().all(|t| t.is_trivia()));
    }

    #[test]
    fn test_file_without_open_tag_is_all_html() {
        let toks = tokenize("class NotPhp {}");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::InlineHtml);
    }

    #[test]
    fn test_close_tag_acts_as_statement_end() {
        let toks = significant("<?php use Foo\\Bar ?>");
        assert_eq!(toks.last(), Some(&(TokenKind::Symbol(';'), "?>")));
    }

    #[test]
    fn test_line_comment_stops_at_close_tag() {
        let toks = significant("<?php // note ?>html<?php class X {}");
        assert!(toks.contains(&(TokenKind::Name, "X")));
    }

    #[test]
    fn test_member_access_operators() {
        let toks = significant("<?php Foo::class; $x?->class;");
        assert_eq!(toks[1], (TokenKind::Other, "::"));
        assert_eq!(toks[2], (TokenKind::Class, "class"));
        assert_eq!(toks[5], (TokenKind::Other, "?->"));
    }

    #[test]
    fn test_offsets_point_into_source() {
        let src = "<?php\nclass Foo {}";
        for tok in tokenize(src) {
            let start = tok.offset as usize;
            assert_eq!(&src[start..start + tok.text.len()], tok.text);
        }
    }

    #[test]
    fn test_unterminated_constructs_do_not_panic() {
        for src in [
            "<?php $a = 'open",
            "<?php $a = \"open\\",
            "<?php /* open",
            "<?php $a = <<<EOT\nnever closed",
            "<?php $a = <<<",
        ] {
            let toks = tokenize(src);
            let total: usize = toks.iter().map(|t| t.text.len()).sum();
            assert_eq!(total, src.len(), "tokens must cover {src:?}");
        }
    }
}
