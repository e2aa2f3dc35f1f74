//! Byte offsets and half-open spans over source text.

use text_size::TextSize;

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open `[start, end)` byte range in a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First byte covered.
    pub start: ByteOffset,
    /// First byte past the span.
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from two offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets as produced by `str` searching.
    ///
    /// Offsets beyond `u32::MAX` saturate; callers work on single source files.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        Self::new(to_offset(start), to_offset(end))
    }

    /// Returns true if `offset` falls inside the span.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the text this span covers, or `None` if it does not fit `text`.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(usize::from(self.start)..usize::from(self.end))
    }
}

pub(crate) fn to_offset(value: usize) -> ByteOffset {
    TextSize::from(u32::try_from(value).unwrap_or(u32::MAX))
}
