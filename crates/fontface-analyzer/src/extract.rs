//! Reading `font-family` and `unicode-range` out of one `@font-face` rule.

use crate::error::describe_value;
use crate::{count_range_code_points, AnalyzeError};
use fontface_css::{walk, AtRule, Declaration, DeclarationValue, Node, Span, ValueNode, Walk};
use smol_str::SmolStr;
use tracing::trace;

const FONT_FAMILY: &str = "font-family";
const UNICODE_RANGE: &str = "unicode-range";

/// A `unicode-range` token as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeToken {
    pub text: SmolStr,
    pub span: Span,
}

/// What one `@font-face` rule declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceRecord {
    /// The last `font-family` string in the rule, if any.
    pub font_family: Option<SmolStr>,
    /// Every `unicode-range` token in the rule, in source order.
    pub unicode_ranges: Vec<RangeToken>,
    /// The span of the rule.
    pub span: Span,
}

impl FontFaceRecord {
    /// Sums the code points of all ranges. No ranges sum to 0.
    pub fn code_point_total(&self) -> Result<u64, AnalyzeError> {
        self.unicode_ranges.iter().try_fold(0u64, |total, range| {
            let count = count_range_code_points(&range.text).map_err(|error| {
                AnalyzeError::InvalidRange {
                    error,
                    span: range.span,
                }
            })?;
            total
                .checked_add(count)
                .ok_or_else(|| AnalyzeError::CountOverflow {
                    family: self.font_family.clone().unwrap_or_default(),
                    span: self.span,
                })
        })
    }
}

/// Collects the `font-family` and `unicode-range` declarations of an
/// `@font-face` rule.
///
/// Property names match exactly and case-sensitively. When `font-family`
/// appears more than once the last one wins. At-rules nested inside the
/// rule are skipped.
pub fn extract_font_face(rule: &AtRule) -> Result<FontFaceRecord, AnalyzeError> {
    let mut record = FontFaceRecord {
        font_family: None,
        unicode_ranges: Vec::new(),
        span: rule.span,
    };

    walk(rule, |node| -> Result<Walk, AnalyzeError> {
        match node {
            Node::AtRule(nested) if !std::ptr::eq(nested, rule) => Ok(Walk::Skip),
            Node::Declaration(decl) if decl.property == FONT_FAMILY => {
                let family = font_family_value(decl)?;
                trace!(family = %family, "font-family");
                record.font_family = Some(family);
                Ok(Walk::Skip)
            }
            Node::Declaration(decl) if decl.property == UNICODE_RANGE => {
                let before = record.unicode_ranges.len();
                collect_unicode_ranges(decl, &mut record.unicode_ranges)?;
                trace!(count = record.unicode_ranges.len() - before, "unicode-range");
                Ok(Walk::Skip)
            }
            _ => Ok(Walk::Continue),
        }
    })?;

    Ok(record)
}

fn font_family_value(decl: &Declaration) -> Result<SmolStr, AnalyzeError> {
    if let DeclarationValue::Value(value) = &decl.value {
        if let [ValueNode::String(family)] = value.children.as_slice() {
            return Ok(SmolStr::new(&family.value));
        }
    }
    Err(AnalyzeError::UnexpectedFontFamilyValue {
        found: describe_value(&decl.value),
        span: decl.value.span(),
    })
}

fn collect_unicode_ranges(
    decl: &Declaration,
    ranges: &mut Vec<RangeToken>,
) -> Result<(), AnalyzeError> {
    let value = match &decl.value {
        DeclarationValue::Value(value) => value,
        DeclarationValue::Raw(raw) => {
            return Err(AnalyzeError::UnexpectedUnicodeRangeValue {
                found: format!("{:?}", raw.value),
                span: raw.span,
            })
        }
    };

    ranges.extend(value.children.iter().filter_map(|child| match child {
        ValueNode::UnicodeRange(range) => Some(RangeToken {
            text: range.value.clone(),
            span: range.span,
        }),
        _ => None,
    }));
    Ok(())
}
