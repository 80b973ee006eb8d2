//! CSS syntax layer for fontface-stats.
//!
//! This crate provides:
//! - A tokenizer using `logos`
//! - A recursive descent parser with error recovery
//! - Typed syntax tree nodes for rules, declarations and values
//! - A pre-order walker with a skip-subtree signal
//!
//! # Example
//!
//! ```
//! use fontface_css::{parse, BlockItem, Rule};
//!
//! let result = parse("@font-face { font-family: 'Inter'; unicode-range: U+0000-00FF; }");
//! assert!(result.errors.is_empty());
//!
//! let Rule::At(rule) = &result.stylesheet.rules[0] else { unreachable!() };
//! assert_eq!(rule.name, "font-face");
//! let block = rule.block.as_ref().unwrap();
//! assert!(matches!(&block.items[0], BlockItem::Declaration(d) if d.property == "font-family"));
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod span;
mod walk;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use span::Span;
pub use walk::{walk, walk_node, Node, Walk};

/// Options for parsing stylesheets.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum nesting of blocks and parenthesized groups.
    pub max_nesting_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 256,
        }
    }
}

/// The result of parsing a stylesheet.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed stylesheet. Always present, even when errors occurred.
    pub stylesheet: StyleSheet,
    /// Errors encountered during parsing, in source order.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns the stylesheet if parsing succeeded, or the first error.
    pub fn into_result(self) -> Result<StyleSheet, ParseError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.stylesheet),
        }
    }
}

/// Parses a stylesheet.
///
/// Parsing never stops early: recoverable problems are collected in
/// [`ParseResult::errors`] next to the best-effort tree.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, ParseOptions::default())
}

/// Parses a stylesheet with custom options.
pub fn parse_with_options(source: &str, options: ParseOptions) -> ParseResult {
    parser::Parser::new(source, options).parse()
}
