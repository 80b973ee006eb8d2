//! Parse error types.

use crate::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// The input ended inside a construct.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// A `{`, `(` or `[` was never closed.
    #[error("unclosed '{delimiter}'")]
    UnclosedBlock {
        /// The opening delimiter.
        delimiter: char,
    },

    /// A `}` with no matching `{`.
    #[error("unmatched '}}'")]
    UnmatchedCloseBrace,

    /// A string reached a newline or the end of input.
    #[error("unterminated string")]
    UnterminatedString,

    /// A comment has no closing `*/`.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// Blocks or groups nest deeper than [`ParseOptions::max_nesting_depth`].
    ///
    /// [`ParseOptions::max_nesting_depth`]: crate::ParseOptions::max_nesting_depth
    #[error("nesting exceeds the limit of {limit} levels")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },

    /// A block item that is neither a declaration nor a rule.
    #[error("invalid declaration: {message}")]
    InvalidDeclaration {
        /// A description of the problem.
        message: String,
    },
}
