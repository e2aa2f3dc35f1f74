//! Prop formatting and edit computation.

use crate::config::Rule;
use crate::tags::TagOccurrence;
use source_map::ByteOffset;

/// A pending insertion into the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Offset in the original text, just past a tag name.
    pub offset: ByteOffset,
    /// Space-prefixed attribute list.
    pub text: String,
}

/// Formats one attribute.
///
/// Quoted strings and `{...}` expressions are used verbatim; anything else is
/// wrapped in braces.
pub fn format_prop(name: &str, value: &str) -> String {
    let value = value.trim();
    if is_verbatim(value) {
        format!("{name}={value}")
    } else {
        format!("{name}={{{value}}}")
    }
}

fn is_verbatim(value: &str) -> bool {
    let wrapped = |open: char, close: char| {
        value.len() >= 2 && value.starts_with(open) && value.ends_with(close)
    };
    wrapped('"', '"') || wrapped('\'', '\'') || wrapped('{', '}')
}

/// Computes the insertion for `rule` at `occurrence`, or `None` when the tag
/// already assigns every prop of the rule.
///
/// Props keep the rule's declared order and are inserted right after the tag
/// name, ahead of existing attributes.
pub fn compute_edit(source: &str, occurrence: &TagOccurrence, rule: &Rule) -> Option<PendingEdit> {
    let mut text = String::new();
    for (name, value) in &rule.props {
        if occurrence.has_attribute(source, name) {
            continue;
        }
        text.push(' ');
        text.push_str(&format_prop(name, value));
    }

    (!text.is_empty()).then(|| PendingEdit {
        offset: occurrence.name_end,
        text,
    })
}
