//! Source map builder for tracking position mappings during editing.

use crate::line_index::LineIndex;
use crate::span::to_offset;
use crate::{ByteOffset, Span};
use text_size::TextSize;

/// A single mapping from generated position to original position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// The span in the generated output.
    pub generated: Span,
    /// The span in the original source.
    pub original: Span,
}

/// A source map that tracks position mappings from generated code back to original source.
///
/// Text inserted by an edit has no mapping; every copied chunk of the
/// original maps 1:1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    /// List of mappings, sorted by generated position.
    mappings: Vec<Mapping>,
}

impl SourceMap {
    /// Creates a new empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of mappings in this source map.
    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if this source map has no mappings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns an iterator over all mappings.
    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    /// Finds the original position corresponding to a generated position.
    ///
    /// Returns `None` for positions inside inserted text.
    pub fn original_position(&self, generated: ByteOffset) -> Option<ByteOffset> {
        let mapping = self.find_mapping_for_generated(generated)?;
        let offset_in_span = u32::from(generated) - u32::from(mapping.generated.start);
        Some(mapping.original.start + TextSize::from(offset_in_span))
    }

    /// Finds the generated position corresponding to an original position.
    pub fn generated_position(&self, original: ByteOffset) -> Option<ByteOffset> {
        // Copied chunks are emitted in original order, so the same search works.
        let idx = match self
            .mappings
            .binary_search_by(|m| m.original.start.cmp(&original))
        {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        let mapping = self
            .mappings
            .get(idx)
            .filter(|m| m.original.contains(original))?;
        let offset_in_span = u32::from(original) - u32::from(mapping.original.start);
        Some(mapping.generated.start + TextSize::from(offset_in_span))
    }

    fn find_mapping_for_generated(&self, generated: ByteOffset) -> Option<&Mapping> {
        let idx = match self
            .mappings
            .binary_search_by(|m| m.generated.start.cmp(&generated))
        {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        self.mappings
            .get(idx)
            .filter(|m| m.generated.contains(generated))
    }

    /// Renders this map in the Source Map v3 format.
    ///
    /// A token is emitted at the start of every copied chunk and at every
    /// generated line start inside it. Columns are UTF-16 code units.
    pub fn to_v3(&self, file: &str, original: &str, generated: &str) -> SourceMapV3 {
        let original_lines = LineIndex::new(original);
        let generated_lines = LineIndex::new(generated);
        let mut builder = sourcemap::SourceMapBuilder::new(Some(file));
        let source = builder.add_source(file);
        builder.set_source_contents(source, Some(original));

        for mapping in &self.mappings {
            let Some(chunk) = mapping.generated.slice(generated) else {
                continue;
            };
            let breaks = chunk
                .bytes()
                .enumerate()
                .filter(|&(i, b)| b == b'\n' && i + 1 < chunk.len())
                .map(|(i, _)| i + 1);

            for delta in std::iter::once(0).chain(breaks) {
                let delta = to_offset(delta);
                let generated_pos =
                    generated_lines.line_col_utf16(generated, mapping.generated.start + delta);
                let original_pos =
                    original_lines.line_col_utf16(original, mapping.original.start + delta);
                if let (Some(to), Some(from)) = (generated_pos, original_pos) {
                    builder.add_raw(to.line, to.col, from.line, from.col, Some(source), None, false);
                }
            }
        }

        builder.into_sourcemap()
    }
}

/// A Source Map v3 document. Serialize it with `to_writer`.
pub type SourceMapV3 = sourcemap::SourceMap;

/// A builder for constructing source maps during transformation.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    mappings: Vec<Mapping>,
    /// Current position in the generated output.
    generated_offset: ByteOffset,
}

impl SourceMapBuilder {
    /// Creates a new source map builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current generated offset.
    #[inline]
    pub fn generated_offset(&self) -> ByteOffset {
        self.generated_offset
    }

    /// Adds verbatim source text, creating a 1:1 mapping.
    pub fn add_source(&mut self, original_start: ByteOffset, text: &str) {
        if text.is_empty() {
            return;
        }
        let len = to_offset(text.len());
        let generated_start = self.generated_offset;
        self.mappings.push(Mapping {
            generated: Span::new(generated_start, generated_start + len),
            original: Span::new(original_start, original_start + len),
        });
        self.generated_offset += len;
    }

    /// Adds generated text without a corresponding original position.
    pub fn add_generated(&mut self, text: &str) {
        self.generated_offset += to_offset(text.len());
    }

    /// Builds the final source map.
    pub fn build(mut self) -> SourceMap {
        self.mappings.sort_by_key(|m| m.generated.start);
        SourceMap {
            mappings: self.mappings,
        }
    }
}
