//! Code point statistics for `@font-face` rules.
//!
//! Given a stylesheet, this crate finds every `@font-face` rule, reads its
//! `font-family` and `unicode-range` descriptors, and reports how many code
//! points each rule covers, grouped by family.
//!
//! # Example
//!
//! ```
//! use fontface_analyzer::analyze;
//!
//! let css = r#"
//!     @font-face {
//!         font-family: 'Noto Sans JP';
//!         src: url(jp-0.woff2) format('woff2');
//!         unicode-range: U+0000-00FF, U+0131, U+0152-0153;
//!     }
//! "#;
//!
//! let stats = analyze(css).unwrap();
//! assert_eq!(stats.get("Noto Sans JP"), Some(&[259][..]));
//! ```

mod analyze;
mod error;
mod extract;
mod range;
mod stats;

pub use analyze::{analyze, analyze_stylesheet};
pub use error::AnalyzeError;
pub use extract::{extract_font_face, FontFaceRecord, RangeToken};
pub use range::{
    count_range_code_points, parse_unicode_range, InvalidRangeError, InvalidRangeReason,
    UnicodeRange,
};
pub use stats::{FamilyStats, FamilySummary};
