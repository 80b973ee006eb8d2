//! Analysis error types.

use crate::InvalidRangeError;
use fontface_css::{DeclarationValue, ParseError, Span};
use smol_str::SmolStr;
use thiserror::Error;

/// An error that aborted an analysis.
///
/// Analysis is all-or-nothing: the first error ends it and no partial
/// statistics are returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    /// The stylesheet has a syntax error.
    #[error("failed to parse stylesheet: {0}")]
    Parse(#[from] ParseError),

    /// A `unicode-range` token is malformed.
    #[error("{error}")]
    InvalidRange {
        /// What was wrong with the token.
        error: InvalidRangeError,
        /// Where the token appears.
        span: Span,
    },

    /// A `font-family` value is not exactly one string.
    #[error("unexpected value for `font-family`: expected a single string, found {found}")]
    UnexpectedFontFamilyValue {
        /// A description of the value that was found.
        found: String,
        /// The span of the value.
        span: Span,
    },

    /// A `unicode-range` value could not be read as a list of components.
    #[error("unexpected value for `unicode-range`: {found}")]
    UnexpectedUnicodeRangeValue {
        /// The raw value text, quoted.
        found: String,
        /// The span of the value.
        span: Span,
    },

    /// The code point total of one rule does not fit in 64 bits.
    #[error("code point total of an `@font-face` rule for `{family}` overflows")]
    CountOverflow {
        /// The family the rule belongs to.
        family: SmolStr,
        /// The span of the rule.
        span: Span,
    },
}

impl AnalyzeError {
    /// Returns the source location the error points at.
    pub fn span(&self) -> Span {
        match self {
            AnalyzeError::Parse(error) => error.span,
            AnalyzeError::InvalidRange { span, .. }
            | AnalyzeError::UnexpectedFontFamilyValue { span, .. }
            | AnalyzeError::UnexpectedUnicodeRangeValue { span, .. }
            | AnalyzeError::CountOverflow { span, .. } => *span,
        }
    }
}

/// Describes the shape of a declaration value for error messages.
pub(crate) fn describe_value(value: &DeclarationValue) -> String {
    match value {
        DeclarationValue::Raw(raw) => format!("raw text {:?}", raw.value),
        DeclarationValue::Value(value) if value.children.is_empty() => {
            "an empty value".to_string()
        }
        DeclarationValue::Value(value) => value
            .children
            .iter()
            .map(|child| child.kind_name())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
