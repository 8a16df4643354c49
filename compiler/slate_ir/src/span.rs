//! Source location spans.
//!
//! Spans are compact byte ranges. Line and column numbers are computed on
//! demand through [`LineIndex`], which only error reporting needs.

use std::fmt;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from source start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range, saturating offsets that do not fit in `u32`.
    ///
    /// Sources larger than 4 GiB are rejected by the parser before any span
    /// is built, so saturation never loses information in practice.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Span { start, end }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Byte range for slicing the source text.
    #[inline]
    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::from_range(range)
    }
}

/// A 1-based line and column position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Byte offsets of every line start, for offset -> line/column lookup.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build the index for `source`.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(offset + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { line_starts }
    }

    /// Number of lines in the indexed source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Locate a byte offset. Columns count characters, not bytes.
    pub fn locate(&self, source: &str, offset: u32) -> SourceLocation {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line_idx).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        SourceLocation {
            line: u32::try_from(line_idx + 1).unwrap_or(u32::MAX),
            column: u32::try_from(column + 1).unwrap_or(u32::MAX),
        }
    }

    /// Text of the 1-based `line`, without its trailing newline.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> Option<&'s str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(source.len(), |next| (*next as usize).saturating_sub(1));
        source
            .get(start..end.max(start))
            .map(|text| text.trim_end_matches('\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_covers_both() {
        let a = Span::new(4, 8);
        let b = Span::new(1, 5);
        assert_eq!(a.merge(b), Span::new(1, 8));
        assert_eq!(a.merge(b).len(), 7);
    }

    #[test]
    fn locate_first_line() {
        let src = "x = 1\ny = 2\n";
        let index = LineIndex::new(src);
        assert_eq!(
            index.locate(src, 4),
            SourceLocation { line: 1, column: 5 }
        );
    }

    #[test]
    fn locate_later_line() {
        let src = "x = 1\ny = 2\n";
        let index = LineIndex::new(src);
        assert_eq!(
            index.locate(src, 6),
            SourceLocation { line: 2, column: 1 }
        );
        assert_eq!(index.line_text(src, 2), Some("y = 2"));
    }

    #[test]
    fn line_text_out_of_range() {
        let src = "only";
        let index = LineIndex::new(src);
        assert_eq!(index.line_text(src, 1), Some("only"));
        assert_eq!(index.line_text(src, 3), None);
        assert_eq!(index.line_text(src, 0), None);
    }
}
