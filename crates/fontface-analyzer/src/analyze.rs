//! Stylesheet-level aggregation.

use crate::extract::extract_font_face;
use crate::{AnalyzeError, FamilyStats};
use fontface_css::{parse, walk, Node, StyleSheet, Walk};
use tracing::debug;

const FONT_FACE: &str = "font-face";

/// Parses `css` and counts the code points of every `@font-face` rule per
/// font family.
///
/// Any syntax error fails the whole analysis with [`AnalyzeError::Parse`].
///
/// ```
/// use fontface_analyzer::analyze;
///
/// let stats = analyze(
///     "@font-face { font-family: 'Inter'; unicode-range: U+0000-00FF; }
///      @font-face { font-family: 'Inter'; unicode-range: U+4??; }",
/// )
/// .unwrap();
/// assert_eq!(stats.get("Inter"), Some(&[256, 256][..]));
/// ```
pub fn analyze(css: &str) -> Result<FamilyStats, AnalyzeError> {
    let stylesheet = parse(css).into_result()?;
    analyze_stylesheet(&stylesheet)
}

/// Counts code points per family in an already parsed stylesheet.
///
/// `@font-face` rules are found at any depth, including inside `@media` and
/// `@supports`. Rules without a `font-family` are not counted.
pub fn analyze_stylesheet(stylesheet: &StyleSheet) -> Result<FamilyStats, AnalyzeError> {
    let mut stats = FamilyStats::new();
    let mut rules = 0usize;

    walk(stylesheet, |node| -> Result<Walk, AnalyzeError> {
        let Node::AtRule(rule) = node else {
            return Ok(Walk::Continue);
        };
        if rule.name != FONT_FACE {
            return Ok(Walk::Continue);
        }
        rules += 1;

        let record = extract_font_face(rule)?;
        let Some(family) = record.font_family.clone() else {
            debug!(
                offset = u32::from(rule.span.start),
                ranges = record.unicode_ranges.len(),
                "skipping @font-face without font-family"
            );
            return Ok(Walk::Skip);
        };

        let total = record.code_point_total()?;
        debug!(family = %family, total, "counted @font-face");
        stats.record(family, total);
        Ok(Walk::Skip)
    })?;

    debug!(rules, families = stats.len(), "analysis finished");
    Ok(stats)
}
