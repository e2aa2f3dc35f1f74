//! Source position tracking and mapping for inject-props.
//!
//! This crate provides the text-editing primitive used by the transformer: an
//! [`EditBuffer`] that records insertions against the original text and, once
//! finished, produces the edited text together with a [`SourceMap`] relating
//! generated positions back to the original file.

mod builder;
mod edit;
mod line_index;
mod span;

pub use builder::{Mapping, SourceMap, SourceMapBuilder, SourceMapV3};
pub use edit::{EditBuffer, EditError, EditedText};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
