//! An insert-only edit buffer over an original source string.

use crate::span::to_offset;
use crate::{ByteOffset, SourceMap, SourceMapBuilder};
use thiserror::Error;

/// Errors from recording an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The offset lies past the end of the original text.
    #[error("insert offset {offset} is out of bounds (length {len})")]
    OutOfBounds {
        /// The requested offset.
        offset: u32,
        /// Length of the original text.
        len: u32,
    },

    /// The offset splits a multi-byte character.
    #[error("insert offset {offset} is not on a char boundary")]
    NotCharBoundary {
        /// The requested offset.
        offset: u32,
    },
}

#[derive(Debug, Clone)]
struct Insert {
    offset: ByteOffset,
    text: String,
}

/// Records insertions against offsets of the original text.
///
/// Offsets always refer to the original text, so recording one insert never
/// shifts another. Inserts at the same offset are emitted in the order they
/// were recorded.
#[derive(Debug, Clone)]
pub struct EditBuffer<'a> {
    original: &'a str,
    inserts: Vec<Insert>,
}

/// The result of applying an [`EditBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedText {
    /// The edited text.
    pub text: String,
    /// Maps positions in `text` back to the original.
    pub map: SourceMap,
}

impl<'a> EditBuffer<'a> {
    /// Creates an empty buffer over `original`.
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            inserts: Vec::new(),
        }
    }

    /// Returns the original text.
    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Returns true if any insert has been recorded.
    pub fn has_changed(&self) -> bool {
        self.inserts.iter().any(|insert| !insert.text.is_empty())
    }

    /// Inserts `text` at `offset` of the original text.
    pub fn insert(
        &mut self,
        offset: impl Into<ByteOffset>,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        let offset = offset.into();
        let at = usize::from(offset);
        if at > self.original.len() {
            return Err(EditError::OutOfBounds {
                offset: offset.into(),
                len: to_offset(self.original.len()).into(),
            });
        }
        if !self.original.is_char_boundary(at) {
            return Err(EditError::NotCharBoundary {
                offset: offset.into(),
            });
        }

        self.inserts.push(Insert {
            offset,
            text: text.into(),
        });
        Ok(())
    }

    /// Applies every insert and returns the edited text with its source map.
    pub fn finish(mut self) -> EditedText {
        // Stable sort keeps recording order for equal offsets.
        self.inserts.sort_by_key(|insert| insert.offset);

        let extra: usize = self.inserts.iter().map(|insert| insert.text.len()).sum();
        let mut text = String::with_capacity(self.original.len() + extra);
        let mut builder = SourceMapBuilder::new();
        let mut cursor = 0usize;

        for insert in &self.inserts {
            let at = usize::from(insert.offset);
            let chunk = &self.original[cursor..at];
            builder.add_source(to_offset(cursor), chunk);
            text.push_str(chunk);

            builder.add_generated(&insert.text);
            text.push_str(&insert.text);
            cursor = at;
        }

        let rest = &self.original[cursor..];
        builder.add_source(to_offset(cursor), rest);
        text.push_str(rest);

        EditedText {
            text,
            map: builder.build(),
        }
    }
}
