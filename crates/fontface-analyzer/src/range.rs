//! The `unicode-range` token grammar.
//!
//! Three forms are recognized, case-insensitively and in this order:
//!
//! | form     | example       | code points          |
//! |----------|---------------|----------------------|
//! | bounded  | `U+0000-00FF` | `end - start + 1`    |
//! | wildcard | `U+4??`       | `16 ^ (number of ?)` |
//! | single   | `U+4E00`      | `1`                  |

use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// A parsed `unicode-range` token.
///
/// Only bounded ranges need their endpoints as numbers. Single and wildcard
/// tokens keep their hex digits as text, uppercased, so any number of digits
/// is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnicodeRange {
    /// `U+<start>-<end>` with `start <= end`.
    Bounded { start: u64, end: u64 },
    /// `U+<prefix>?...`: every code point starting with `prefix`.
    Wildcard { prefix: SmolStr, wildcards: u32 },
    /// `U+<code point>`.
    Single(SmolStr),
}

impl UnicodeRange {
    /// Returns the number of code points this range denotes.
    ///
    /// Parsing guarantees this fits in a `u64`.
    pub fn len(&self) -> u64 {
        match self {
            UnicodeRange::Bounded { start, end } => end - start + 1,
            UnicodeRange::Wildcard { wildcards, .. } => 16u64.pow(*wildcards),
            UnicodeRange::Single(_) => 1,
        }
    }

    /// A range always covers at least one code point.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for UnicodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnicodeRange::Bounded { start, end } => write!(f, "U+{start:04X}-{end:04X}"),
            UnicodeRange::Wildcard { prefix, wildcards } => {
                write!(f, "U+{prefix}")?;
                for _ in 0..*wildcards {
                    write!(f, "?")?;
                }
                Ok(())
            }
            UnicodeRange::Single(digits) => write!(f, "U+{digits}"),
        }
    }
}

/// A token that is not a valid `unicode-range`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid unicode-range `{token}`: {reason}")]
pub struct InvalidRangeError {
    /// The offending token, as written.
    pub token: String,
    /// Why it was rejected.
    pub reason: InvalidRangeReason,
}

/// Why a `unicode-range` token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidRangeReason {
    /// Matches none of the three forms.
    #[error("expected `U+<hex>`, `U+<hex>-<hex>` or `U+<hex>` followed by `?` wildcards")]
    Syntax,
    /// A bounded range whose start lies after its end.
    #[error("start U+{start:X} is greater than end U+{end:X}")]
    Reversed { start: u64, end: u64 },
    /// A bounded range endpoint or the resulting count does not fit in 64 bits.
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Parses one `unicode-range` token such as `U+0000-00FF`.
pub fn parse_unicode_range(token: &str) -> Result<UnicodeRange, InvalidRangeError> {
    let fail = |reason| InvalidRangeError {
        token: token.to_string(),
        reason,
    };

    let rest = match token.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("u+") => &token[2..],
        _ => return Err(fail(InvalidRangeReason::Syntax)),
    };

    if let Some((start, end)) = rest.split_once('-') {
        if !is_hex(start) || !is_hex(end) {
            return Err(fail(InvalidRangeReason::Syntax));
        }
        let start = parse_hex(start).ok_or_else(|| fail(InvalidRangeReason::Overflow))?;
        let end = parse_hex(end).ok_or_else(|| fail(InvalidRangeReason::Overflow))?;
        if start > end {
            return Err(fail(InvalidRangeReason::Reversed { start, end }));
        }
        if end - start == u64::MAX {
            return Err(fail(InvalidRangeReason::Overflow));
        }
        return Ok(UnicodeRange::Bounded { start, end });
    }

    if rest.contains('?') {
        let digits = rest.trim_end_matches('?');
        if !digits.is_empty() && !is_hex(digits) {
            return Err(fail(InvalidRangeReason::Syntax));
        }
        let wildcards = wildcard_count(rest.len() - digits.len())
            .ok_or_else(|| fail(InvalidRangeReason::Overflow))?;
        return Ok(UnicodeRange::Wildcard {
            prefix: SmolStr::new(digits.to_ascii_uppercase()),
            wildcards,
        });
    }

    if is_hex(rest) {
        return Ok(UnicodeRange::Single(SmolStr::new(rest.to_ascii_uppercase())));
    }

    Err(fail(InvalidRangeReason::Syntax))
}

/// Returns how many code points a `unicode-range` token denotes.
///
/// ```
/// use fontface_analyzer::count_range_code_points;
///
/// assert_eq!(count_range_code_points("U+0000-00FF").unwrap(), 256);
/// assert_eq!(count_range_code_points("u+4??").unwrap(), 256);
/// assert_eq!(count_range_code_points("U+4E00").unwrap(), 1);
/// assert!(count_range_code_points("U+0200-0100").is_err());
/// ```
pub fn count_range_code_points(token: &str) -> Result<u64, InvalidRangeError> {
    parse_unicode_range(token).map(|range| range.len())
}

fn is_hex(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_hex(digits: &str) -> Option<u64> {
    u64::from_str_radix(digits, 16).ok()
}

/// Returns the number of `?` characters if `16 ^ n` fits in a `u64`.
fn wildcard_count(n: usize) -> Option<u32> {
    let n = u32::try_from(n).ok()?;
    16u64.checked_pow(n).map(|_| n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reason(token: &str) -> InvalidRangeReason {
        parse_unicode_range(token).unwrap_err().reason
    }

    #[test]
    fn test_single_code_point() {
        assert_eq!(count_range_code_points("U+4E00"), Ok(1));
        assert_eq!(count_range_code_points("U+0"), Ok(1));
        assert_eq!(
            parse_unicode_range("u+10ffff"),
            Ok(UnicodeRange::Single("10FFFF".into()))
        );
    }

    #[test]
    fn test_bounded_range() {
        assert_eq!(count_range_code_points("U+0000-00FF"), Ok(256));
        assert_eq!(count_range_code_points("U+015E-015F"), Ok(2));
        assert_eq!(count_range_code_points("U+0041-0041"), Ok(1));
        assert_eq!(count_range_code_points("U+0-10FFFF"), Ok(0x110000));
    }

    #[test]
    fn test_bounded_range_matches_formula() {
        for (start, end) in [(0u64, 0u64), (0x20, 0x7E), (0x3000, 0x9FFF), (0xE000, 0xF8FF)] {
            let token = format!("U+{start:X}-{end:X}");
            assert_eq!(count_range_code_points(&token), Ok(end - start + 1), "{token}");
        }
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(count_range_code_points("U+4??"), Ok(256));
        assert_eq!(count_range_code_points("U+??"), Ok(256));
        assert_eq!(count_range_code_points("U+5???"), Ok(4096));
        assert_eq!(count_range_code_points("U+?"), Ok(16));
        assert_eq!(
            parse_unicode_range("U+4E??"),
            Ok(UnicodeRange::Wildcard {
                prefix: "4E".into(),
                wildcards: 2
            })
        );
    }

    #[test]
    fn test_wildcard_count_ignores_prefix_length() {
        for token in ["U+??", "U+1??", "U+12??", "U+123??", "U+1234??"] {
            assert_eq!(count_range_code_points(token), Ok(256), "{token}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(count_range_code_points("u+0000-00ff"), Ok(256));
        assert_eq!(count_range_code_points("U+0000-00FF"), Ok(256));
        assert_eq!(count_range_code_points("u+4e??"), Ok(256));
        assert_eq!(count_range_code_points("u+AbCd"), Ok(1));
    }

    #[test]
    fn test_reversed_range() {
        assert_eq!(
            reason("U+0200-0100"),
            InvalidRangeReason::Reversed {
                start: 0x200,
                end: 0x100
            }
        );
        insta::assert_snapshot!(
            count_range_code_points("U+0200-0100").unwrap_err().to_string(),
            @"invalid unicode-range `U+0200-0100`: start U+200 is greater than end U+100"
        );
    }

    #[test]
    fn test_syntax_errors() {
        for token in [
            "",
            "U+",
            "U-0041",
            "0041",
            "U+00G1",
            "U+0041-",
            "U+-0041",
            "U+0041-00Z1",
            "U+??4",
            "U+4?4?",
            "U+4?-5?",
            "U+0041-0042-0043",
            "U+ 0041",
            "V+0041",
        ] {
            assert_eq!(reason(token), InvalidRangeReason::Syntax, "{token:?}");
        }
    }

    #[test]
    fn test_long_hex_groups_still_count() {
        assert_eq!(count_range_code_points("U+11111111111111111"), Ok(1));
        assert_eq!(count_range_code_points("U+11111111111111111?"), Ok(16));
        assert_eq!(
            count_range_code_points(&format!("U+{}??", "F".repeat(40))),
            Ok(256)
        );
    }

    #[test]
    fn test_overflow() {
        assert_eq!(reason("U+1FFFFFFFFFFFFFFFF-1FFFFFFFFFFFFFFFF"), InvalidRangeReason::Overflow);
        assert_eq!(reason("U+0-FFFFFFFFFFFFFFFF"), InvalidRangeReason::Overflow);
        assert_eq!(reason("U+????????????????"), InvalidRangeReason::Overflow);
        assert_eq!(count_range_code_points("U+???????????????"), Ok(1 << 60));
    }

    #[test]
    fn test_wildcard_count_limits() {
        assert_eq!(wildcard_count(0), Some(0));
        assert_eq!(wildcard_count(15), Some(15));
        assert_eq!(wildcard_count(16), None);
        assert_eq!(wildcard_count(usize::MAX), None);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_wildcard_count_does_not_truncate() {
        // 2^32 + 2 would wrap to 2 if narrowed with `as`.
        assert_eq!(wildcard_count((1usize << 32) + 2), None);
    }

    #[test]
    fn test_non_ascii_input() {
        assert_eq!(reason("Ü+0041"), InvalidRangeReason::Syntax);
        assert_eq!(reason("U+００４１"), InvalidRangeReason::Syntax);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            parse_unicode_range("u+0-ff").unwrap().to_string(),
            "U+0000-00FF"
        );
        assert_eq!(parse_unicode_range("u+4e??").unwrap().to_string(), "U+4E??");
        assert_eq!(parse_unicode_range("U+??").unwrap().to_string(), "U+??");
        assert_eq!(parse_unicode_range("u+00e9").unwrap().to_string(), "U+00E9");
    }
}
