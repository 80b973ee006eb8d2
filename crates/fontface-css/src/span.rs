//! Byte spans into the stylesheet source.

use std::ops::Range;
use text_size::{TextRange, TextSize};

/// A half-open byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: TextSize,
    /// The end byte offset (exclusive).
    pub end: TextSize,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<TextSize>, end: impl Into<TextSize>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<TextSize>) -> Self {
        let offset = offset.into();
        Self::new(offset, offset)
    }

    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the byte range, for slicing and for diagnostic labels.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        u32::from(self.start) as usize..u32::from(self.end) as usize
    }

    /// Returns the source text covered by this span.
    ///
    /// Out-of-bounds spans yield an empty string rather than panicking.
    pub fn text(self, source: &str) -> &str {
        source.get(self.to_range()).unwrap_or_default()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(
            TextSize::from(range.start as u32),
            TextSize::from(range.end as u32),
        )
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_slices_source() {
        let source = "@font-face { }";
        let span = Span::from(1..10);
        assert_eq!(span.text(source), "font-face");
        assert_eq!(span.len(), TextSize::from(9));
    }

    #[test]
    fn test_text_out_of_bounds() {
        assert_eq!(Span::from(4..40).text("abc"), "");
    }

    #[test]
    fn test_cover() {
        let covered = Span::from(5..10).cover(Span::from(8..20));
        assert_eq!(covered, Span::from(5..20));
        assert!(Span::empty(3u32).is_empty());
    }
}
