//! Line index for offset to line/column conversion.

use crate::ByteOffset;
use text_size::TextSize;

/// A line and column position (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column. Byte based for [`LineIndex::line_col`], UTF-16 code
    /// units for [`LineIndex::line_col_utf16`].
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Stores the byte offset of every line start, giving O(log n) lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset where line `i` begins.
    line_starts: Vec<ByteOffset>,
}

impl LineIndex {
    /// Creates a new line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(crate::span::to_offset(offset + 1));
            }
        }

        Self { line_starts }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_of(&self, offset: ByteOffset) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Converts a byte offset to a line and byte column.
    pub fn line_col(&self, offset: ByteOffset) -> LineCol {
        let line = self.line_of(offset);
        let col = u32::from(offset) - u32::from(self.line_starts[line]);
        LineCol::new(line as u32, col)
    }

    /// Converts a byte offset to a line and UTF-16 column, the unit source map
    /// consumers expect.
    ///
    /// Returns `None` if the offset is out of bounds or not on a char boundary.
    pub fn line_col_utf16(&self, text: &str, offset: ByteOffset) -> Option<LineCol> {
        let line = self.line_of(offset);
        let start = usize::from(self.line_starts[line]);
        let prefix = text.get(start..usize::from(offset))?;
        let col = prefix.encode_utf16().count() as u32;
        Some(LineCol::new(line as u32, col))
    }

    /// Converts a line and byte column back to a byte offset.
    ///
    /// Returns `None` if the line is out of bounds.
    pub fn offset(&self, line_col: LineCol) -> Option<ByteOffset> {
        let line_start = self.line_starts.get(line_col.line as usize)?;
        Some(*line_start + TextSize::from(line_col.col))
    }
}
