//! Recursive descent parser for CSS stylesheets.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{ParseOptions, ParseResult, Span};
use smol_str::SmolStr;
use text_size::TextSize;

/// The CSS parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token stream, ending with `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// End offset of the last consumed token.
    last_end: TextSize,
    /// Current block nesting depth.
    depth: usize,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
    /// Parser options.
    options: ParseOptions,
    /// EOF token for when we're past the end
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str, options: ParseOptions) -> Self {
        let tokens: Vec<Token> = Lexer::new(source).collect();
        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            tokens,
            pos: 0,
            last_end: TextSize::from(0),
            depth: 0,
            errors: Vec::new(),
            options,
            eof_token,
        }
    }

    /// Parses the source into a stylesheet.
    pub fn parse(mut self) -> ParseResult {
        self.report_bad_tokens();
        let stylesheet = self.parse_stylesheet();
        self.errors.sort_by_key(|e| e.span.start);
        ParseResult {
            stylesheet,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Returns the kind of the token `n` positions ahead.
    fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Returns the text of the current token.
    fn current_text(&self) -> &'src str {
        self.current().span.text(self.source)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() && self.current_kind() != TokenKind::Eof {
            self.last_end = self.current().span.end;
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advances if the current token matches, returns true if matched.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Reports an error at the given span.
    fn error_at(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    /// Reports an error at the current position.
    fn error(&mut self, kind: ParseErrorKind) {
        let span = self.current().span;
        self.error_at(kind, span);
    }

    /// Builds a raw text node from `start` to the end of the last consumed token.
    fn raw_from(&self, start: TextSize) -> Option<Raw> {
        if self.last_end <= start {
            return None;
        }
        let span = Span::new(start, self.last_end);
        Some(Raw {
            value: span.text(self.source).to_string(),
            span,
        })
    }

    /// Records errors for tokens the lexer could not finish.
    fn report_bad_tokens(&mut self) {
        let bad: Vec<ParseError> = self
            .tokens
            .iter()
            .filter_map(|token| match token.kind {
                TokenKind::BadString => Some(ParseError::new(
                    ParseErrorKind::UnterminatedString,
                    token.span,
                )),
                TokenKind::BadComment => Some(ParseError::new(
                    ParseErrorKind::UnterminatedComment,
                    token.span,
                )),
                _ => None,
            })
            .collect();
        self.errors.extend(bad);
    }

    /// Enters a nested construct, reporting an error past the depth limit.
    fn enter(&mut self) -> bool {
        if self.depth >= self.options.max_nesting_depth {
            self.error(ParseErrorKind::NestingTooDeep {
                limit: self.options.max_nesting_depth,
            });
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // === Rules ===

    fn parse_stylesheet(&mut self) -> StyleSheet {
        let mut rules = Vec::new();

        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                // HTML comment markers are allowed between top-level rules.
                TokenKind::Cdo | TokenKind::Cdc => self.advance(),
                TokenKind::RBrace => {
                    self.error(ParseErrorKind::UnmatchedCloseBrace);
                    self.advance();
                }
                TokenKind::AtKeyword => rules.push(Rule::At(self.parse_at_rule())),
                _ => {
                    if let Some(rule) = self.parse_qualified_rule() {
                        rules.push(Rule::Qualified(rule));
                    }
                }
            }
        }

        StyleSheet {
            rules,
            span: Span::new(TextSize::from(0), TextSize::from(self.source.len() as u32)),
        }
    }

    /// Parses `@name prelude { block }` or `@name prelude;`.
    fn parse_at_rule(&mut self) -> AtRule {
        let start = self.current().span.start;
        let name = SmolStr::new(&self.current_text()[1..]);
        self.advance();

        let prelude_start = self.current().span.start;
        loop {
            match self.current_kind() {
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Eof => {
                    break
                }
                kind if kind.opens_block() => self.skip_group(),
                _ => self.advance(),
            }
        }
        let prelude = self.raw_from(prelude_start);

        let block = match self.current_kind() {
            TokenKind::LBrace => Some(self.parse_block()),
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            _ => None,
        };

        AtRule {
            name,
            prelude,
            block,
            span: Span::new(start, self.last_end),
        }
    }

    /// Parses `prelude { block }`.
    ///
    /// Returns `None` when no `{` follows the prelude.
    fn parse_qualified_rule(&mut self) -> Option<QualifiedRule> {
        let start = self.current().span.start;
        loop {
            match self.current_kind() {
                TokenKind::LBrace => break,
                TokenKind::RBrace => return None,
                TokenKind::Eof => {
                    self.error(ParseErrorKind::UnexpectedEof {
                        expected: "'{'".to_string(),
                    });
                    return None;
                }
                kind if kind.opens_block() => self.skip_group(),
                _ => self.advance(),
            }
        }
        let prelude = self.raw_from(start).unwrap_or(Raw {
            value: String::new(),
            span: Span::empty(start),
        });
        let block = self.parse_block();

        Some(QualifiedRule {
            prelude,
            span: Span::new(start, self.last_end),
            block,
        })
    }

    /// Parses a `{ ... }` body. The current token must be `{`.
    fn parse_block(&mut self) -> Block {
        let open = self.current().span;
        self.advance();
        if !self.enter() {
            self.skip_to_block_end(open);
            return Block {
                items: Vec::new(),
                span: Span::new(open.start, self.last_end),
            };
        }

        let mut items = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at(ParseErrorKind::UnclosedBlock { delimiter: '{' }, open);
                    break;
                }
                TokenKind::Semicolon => self.advance(),
                TokenKind::AtKeyword => items.push(BlockItem::AtRule(self.parse_at_rule())),
                _ => match self.classify_block_item() {
                    ItemShape::Declaration => {
                        items.push(BlockItem::Declaration(self.parse_declaration()))
                    }
                    ItemShape::Rule => {
                        if let Some(rule) = self.parse_qualified_rule() {
                            items.push(BlockItem::Rule(rule));
                        }
                    }
                    ItemShape::Invalid => self.recover_invalid_item(),
                },
            }
        }

        self.leave();
        Block {
            items,
            span: Span::new(open.start, self.last_end),
        }
    }

    /// Decides whether the item at the current position is a declaration or
    /// a nested rule, without consuming anything.
    fn classify_block_item(&self) -> ItemShape {
        let declaration_start =
            self.current_kind() == TokenKind::Ident && self.peek_kind(1) == TokenKind::Colon;
        if declaration_start && self.current_text().starts_with("--") {
            return ItemShape::Declaration;
        }

        let mut depth = 0usize;
        for token in &self.tokens[self.pos.min(self.tokens.len())..] {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::Function => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::LBrace if depth == 0 => return ItemShape::Rule,
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::RBrace | TokenKind::Eof => break,
                _ => {}
            }
        }

        if declaration_start {
            ItemShape::Declaration
        } else {
            ItemShape::Invalid
        }
    }

    /// Skips a malformed block item up to and including its `;`.
    fn recover_invalid_item(&mut self) {
        let found = self.current_kind().name().to_string();
        let start = self.current().span.start;
        loop {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace | TokenKind::Eof => break,
                kind if kind.opens_block() => self.skip_group(),
                _ => self.advance(),
            }
        }
        self.error_at(
            ParseErrorKind::InvalidDeclaration {
                message: format!("expected a property name followed by ':', found {found}"),
            },
            Span::new(start, self.last_end.max(start)),
        );
    }

    // === Declarations ===

    /// Parses `property: value [!important]`. The current token must be an
    /// identifier followed by `:`.
    fn parse_declaration(&mut self) -> Declaration {
        let start = self.current().span.start;
        let property = SmolStr::new(self.current_text());
        self.advance();
        self.eat(TokenKind::Colon);
        let colon_end = self.last_end;
        let custom = property.starts_with("--");

        let value_start = self.pos;
        let mut open_groups: Vec<Token> = Vec::new();
        loop {
            let token = *self.current();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::RBrace => match open_groups.last() {
                    Some(open) if open.kind == TokenKind::LBrace => {
                        open_groups.pop();
                    }
                    _ => break,
                },
                TokenKind::Semicolon if open_groups.is_empty() => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::Function => {
                    if open_groups.len() == self.options.max_nesting_depth {
                        self.error(ParseErrorKind::NestingTooDeep {
                            limit: self.options.max_nesting_depth,
                        });
                    }
                    open_groups.push(token);
                }
                TokenKind::LBrace if custom => open_groups.push(token),
                TokenKind::LBrace => break,
                TokenKind::RParen | TokenKind::RBracket => {
                    open_groups.pop();
                }
                _ => {}
            }
            self.advance();
        }
        if let Some(open) = open_groups.first() {
            let delimiter = self.source[open.span.to_range()].chars().last().unwrap_or('(');
            self.error_at(ParseErrorKind::UnclosedBlock { delimiter }, open.span);
        }
        if self.check(TokenKind::LBrace) {
            self.error(ParseErrorKind::UnexpectedToken {
                expected: "';'".to_string(),
                found: TokenKind::LBrace.name().to_string(),
            });
            self.skip_group();
        }

        let mut value_tokens = &self.tokens[value_start..self.pos];
        let important = is_important_suffix(value_tokens, self.source);
        if important {
            value_tokens = &value_tokens[..value_tokens.len() - 2];
        }

        let value_span = match (value_tokens.first(), value_tokens.last()) {
            (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
            _ => Span::empty(colon_end),
        };
        let value = if custom {
            DeclarationValue::Raw(Raw {
                value: value_span.text(self.source).to_string(),
                span: value_span,
            })
        } else {
            match ValueParser::new(self.source, value_tokens).parse() {
                Some(children) => DeclarationValue::Value(Value {
                    children,
                    span: value_span,
                }),
                None => DeclarationValue::Raw(Raw {
                    value: value_span.text(self.source).to_string(),
                    span: value_span,
                }),
            }
        };

        let span = Span::new(start, self.last_end);
        self.eat(TokenKind::Semicolon);

        Declaration {
            property,
            value,
            important,
            span,
        }
    }

    // === Recovery ===

    /// Skips a balanced `(...)`, `[...]`, `fn(...)` or `{...}` group.
    fn skip_group(&mut self) {
        let open = *self.current();
        let closer = match open.kind {
            TokenKind::LBrace => TokenKind::RBrace,
            TokenKind::LBracket => TokenKind::RBracket,
            _ => TokenKind::RParen,
        };
        self.advance();
        if !self.enter() {
            return;
        }

        loop {
            match self.current_kind() {
                kind if kind == closer => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    let delimiter = self.source[open.span.to_range()].chars().last().unwrap_or('(');
                    self.error_at(ParseErrorKind::UnclosedBlock { delimiter }, open.span);
                    break;
                }
                TokenKind::RBrace => {
                    let delimiter = self.source[open.span.to_range()].chars().last().unwrap_or('(');
                    self.error_at(ParseErrorKind::UnclosedBlock { delimiter }, open.span);
                    break;
                }
                kind if kind.opens_block() => self.skip_group(),
                _ => self.advance(),
            }
        }
        self.leave();
    }

    /// Skips to the `}` closing the block opened at `open`, consuming it.
    fn skip_to_block_end(&mut self, open: Span) {
        let mut depth = 1usize;
        loop {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Eof => {
                    self.error_at(ParseErrorKind::UnclosedBlock { delimiter: '{' }, open);
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// What a block item turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemShape {
    Declaration,
    Rule,
    Invalid,
}

/// Returns true if the value tokens end with `! important`.
fn is_important_suffix(tokens: &[Token], source: &str) -> bool {
    match tokens {
        [.., bang, ident] => {
            bang.kind == TokenKind::Delim
                && bang.span.text(source) == "!"
                && ident.kind == TokenKind::Ident
                && ident.span.text(source).eq_ignore_ascii_case("important")
        }
        _ => false,
    }
}

/// Builds value nodes from the tokens of one declaration value.
///
/// Returns `None` as soon as a token has no place in a value, so the caller
/// can keep the whole value as raw text.
struct ValueParser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ValueParser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<Vec<ValueNode>> {
        let (children, _) = self.parse_list(None)?;
        Some(children)
    }

    fn text(&self, token: &Token) -> &'a str {
        token.span.text(self.source)
    }

    /// Parses nodes until `closer` (consumed) or the end of the tokens.
    /// Returns the nodes and the end offset of the closer.
    fn parse_list(&mut self, closer: Option<TokenKind>) -> Option<(Vec<ValueNode>, TextSize)> {
        let mut children = Vec::new();

        while let Some(token) = self.tokens.get(self.pos).copied() {
            self.pos += 1;
            let span = token.span;
            let node = match token.kind {
                kind if Some(kind) == closer => return Some((children, span.end)),
                TokenKind::Ident => ValueNode::Identifier(Identifier {
                    name: SmolStr::new(self.text(&token)),
                    span,
                }),
                TokenKind::Hash => ValueNode::Hash(Identifier {
                    name: SmolStr::new(&self.text(&token)[1..]),
                    span,
                }),
                TokenKind::String => ValueNode::String(StringLiteral {
                    value: decode_string(self.text(&token)),
                    span,
                }),
                TokenKind::Number => ValueNode::Number(Numeric {
                    value: self.text(&token).parse().ok()?,
                    span,
                }),
                TokenKind::Percentage => {
                    let text = self.text(&token);
                    ValueNode::Percentage(Numeric {
                        value: text[..text.len() - 1].parse().ok()?,
                        span,
                    })
                }
                TokenKind::Dimension => {
                    let (number, unit) = split_dimension(self.text(&token));
                    ValueNode::Dimension(Dimension {
                        value: number.parse().ok()?,
                        unit: SmolStr::new(unit),
                        span,
                    })
                }
                TokenKind::Url => {
                    let text = self.text(&token);
                    let inner = &text[4..text.len() - 1];
                    ValueNode::Url(Url {
                        value: inner.trim().to_string(),
                        span,
                    })
                }
                TokenKind::UnicodeRange => ValueNode::UnicodeRange(UnicodeRangeNode {
                    value: SmolStr::new(self.text(&token)),
                    span,
                }),
                TokenKind::Comma => ValueNode::Operator(Operator { value: ',', span }),
                TokenKind::Delim => {
                    let value = self.text(&token).chars().next()?;
                    if !matches!(value, '/' | '*' | '+' | '-' | '=' | '<' | '>') {
                        return None;
                    }
                    ValueNode::Operator(Operator { value, span })
                }
                TokenKind::Function => {
                    let text = self.text(&token);
                    let (children, end) = self.parse_list(Some(TokenKind::RParen))?;
                    ValueNode::Function(Function {
                        name: SmolStr::new(&text[..text.len() - 1]),
                        children,
                        span: Span::new(span.start, end),
                    })
                }
                TokenKind::LParen => {
                    let (children, end) = self.parse_list(Some(TokenKind::RParen))?;
                    ValueNode::Parentheses(Group {
                        children,
                        span: Span::new(span.start, end),
                    })
                }
                TokenKind::LBracket => {
                    let (children, end) = self.parse_list(Some(TokenKind::RBracket))?;
                    ValueNode::Brackets(Group {
                        children,
                        span: Span::new(span.start, end),
                    })
                }
                _ => return None,
            };
            children.push(node);
        }

        match closer {
            Some(_) => None,
            None => Some((children, self.tokens.last().map(|t| t.span.end).unwrap_or_default())),
        }
    }
}

/// Splits a dimension token into its numeric part and its unit.
fn split_dimension(text: &str) -> (&str, &str) {
    let sign = usize::from(text.starts_with(|c| c == '+' || c == '-'));
    let unit_start = text[sign..]
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|i| i + sign)
        .unwrap_or(text.len());
    text.split_at(unit_start)
}

/// Removes the quotes from a string token and resolves CSS escapes.
pub(crate) fn decode_string(token: &str) -> String {
    let inner = match token.chars().next() {
        Some(quote @ ('"' | '\'')) if token.len() >= 2 && token.ends_with(quote) => {
            &token[1..token.len() - 1]
        }
        Some('"' | '\'') => &token[1..],
        _ => token,
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            None => {}
            Some('\n') | Some('\x0C') => {
                chars.next();
            }
            Some('\r') => {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(h) if h.is_ascii_hexdigit() => {
                let mut code = 0u32;
                let mut digits = 0;
                while digits < 6 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            code = code * 16 + d;
                            digits += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                match chars.peek().copied() {
                    Some('\r') => {
                        chars.next();
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                    }
                    Some(' ' | '\t' | '\n' | '\x0C') => {
                        chars.next();
                    }
                    _ => {}
                }
                let decoded = if code == 0 {
                    None
                } else {
                    char::from_u32(code)
                };
                out.push(decoded.unwrap_or('\u{FFFD}'));
            }
            Some(other) => {
                chars.next();
                out.push(other);
            }
        }
    }
    out
}
