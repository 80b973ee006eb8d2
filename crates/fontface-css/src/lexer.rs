//! CSS tokenizer using logos.
//!
//! The token set is the subset of CSS Syntax Level 3 needed to build a
//! rule/declaration tree. Whitespace and comments are dropped by [`Lexer`];
//! unterminated strings and comments are reported as their own kinds so the
//! parser can turn them into errors. Names may contain any non-ASCII
//! character, and a leading byte-order mark is skipped.

use crate::Span;
use logos::Logos;

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `<!--`
    #[token("<!--")]
    Cdo,

    /// `-->`
    #[token("-->")]
    Cdc,

    /// A single punctuation character with no structural meaning.
    #[regex(r"[!#$%&*+./<=>?@^|~-]")]
    Delim,

    /// `/* ... */`, filtered out by [`Lexer`].
    #[token("/*", lex_comment)]
    Comment,

    /// An identifier such as `font-family`, `sans-serif` or `--custom`.
    #[regex(r"-?-?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}-]*")]
    Ident,

    /// An identifier immediately followed by `(`.
    #[regex(r"-?-?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}-]*\(")]
    Function,

    /// `@` followed by an identifier.
    #[regex(r"@-?-?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}-]*")]
    AtKeyword,

    /// `#` followed by name characters.
    #[regex(r"#[a-zA-Z0-9_\x{80}-\x{10FFFF}-]+")]
    Hash,

    /// A quoted string, including its quotes.
    #[token("\"", lex_string)]
    #[token("'", lex_string)]
    String,

    /// An unquoted `url(...)`.
    #[regex(r"[uU][rR][lL]\([ \t\r\n\f]*[^\x22'() \t\r\n\f\\]*[ \t\r\n\f]*\)")]
    Url,

    /// A number without a unit.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)")]
    Number,

    /// A number followed by `%`.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)%")]
    Percentage,

    /// A number followed by a unit identifier.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)-?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}-]*")]
    Dimension,

    /// A `unicode-range` token such as `U+0000-00FF` or `U+4??`.
    ///
    /// Accepted loosely; the exact grammar is validated by whoever consumes
    /// the token text.
    #[regex(r"[uU]\+[0-9a-fA-F?]+(-[0-9a-fA-F?]+)?")]
    UnicodeRange,

    /// A string that reached a newline or the end of input before its
    /// closing quote.
    BadString,

    /// A comment with no closing `*/`.
    BadComment,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Cdo => "'<!--'",
            TokenKind::Cdc => "'-->'",
            TokenKind::Delim => "delimiter",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::Function => "function",
            TokenKind::AtKeyword => "at-keyword",
            TokenKind::Hash => "hash",
            TokenKind::String => "string",
            TokenKind::Url => "url",
            TokenKind::Number => "number",
            TokenKind::Percentage => "percentage",
            TokenKind::Dimension => "dimension",
            TokenKind::UnicodeRange => "unicode-range",
            TokenKind::BadString => "unterminated string",
            TokenKind::BadComment => "unterminated comment",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }

    /// Returns true for tokens that open a nested block.
    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket | TokenKind::Function
        )
    }
}

/// Consumes the remainder of a comment after `/*`.
fn lex_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Consumes the remainder of a string after its opening quote.
///
/// A backslash escapes the next byte, so escaped quotes and escaped newlines
/// stay inside the string. A raw newline or the end of input terminates it as
/// an error.
fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let quote = lex.slice().as_bytes()[0];
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, byte) in rest.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => escaped = true,
            b'\n' | b'\r' | b'\x0C' => {
                lex.bump(i);
                return false;
            }
            b if b == quote => {
                lex.bump(i + 1);
                return true;
            }
            _ => {}
        }
    }
    lex.bump(rest.len());
    false
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// A lexer for CSS source code.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    ///
    /// A leading byte-order mark is skipped. Spans stay relative to the start
    /// of `source`, mark included.
    pub fn new(source: &'src str) -> Self {
        let mut inner = TokenKind::lexer(source);
        if source.starts_with(BYTE_ORDER_MARK) {
            inner.bump(BYTE_ORDER_MARK.len_utf8());
        }
        Self {
            inner,
            source,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Classifies a span logos could not match.
    fn classify_error(slice: &str) -> TokenKind {
        if slice.starts_with('"') || slice.starts_with('\'') {
            TokenKind::BadString
        } else if slice.starts_with("/*") {
            TokenKind::BadComment
        } else {
            TokenKind::Error
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let kind = match self.inner.next() {
                Some(Ok(TokenKind::Comment)) => continue,
                Some(Ok(kind)) => kind,
                Some(Err(())) => Self::classify_error(self.inner.slice()),
                None => {
                    self.finished = true;
                    return Some(Token {
                        kind: TokenKind::Eof,
                        span: Span::empty(text_size::TextSize::from(self.source.len() as u32)),
                    });
                }
            };
            return Some(Token {
                kind,
                span: Span::from(self.inner.span()),
            });
        }
    }
}
