//! Opening-tag scanning.
//!
//! A tag's attribute region is treated as opaque text. The scanner only needs
//! to find where the tag ends, which means stepping over quoted values,
//! comments and brace-balanced expressions so that a `>` inside `{() => x}`
//! or `style={{ a: b > c }}` does not end the tag early.

use crate::error::TransformError;
use regex::Regex;
use smol_str::SmolStr;
use source_map::{ByteOffset, Span};

/// One opening tag of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    /// The tag name as written, the binding's local name.
    pub tag_name: SmolStr,
    /// Offset just past the tag name. Injected props go here.
    pub name_end: ByteOffset,
    /// Everything between the tag name and the closing `>` or `/>`.
    pub attributes: Span,
    /// Whether the tag ends with `/>`.
    pub self_closing: bool,
}

impl TagOccurrence {
    /// Returns the text of the attribute region.
    pub fn attribute_text<'a>(&self, source: &'a str) -> &'a str {
        self.attributes.slice(source).unwrap_or("")
    }

    /// Returns true if the tag assigns `name` a value.
    ///
    /// The attribute counts as present when it is written `name="..."`,
    /// `name='...'` or `name={...}`, with optional whitespace around `=`. A
    /// bare `name` without a value does not count.
    pub fn has_attribute(&self, source: &str, name: &str) -> bool {
        let region = self.attribute_text(source);
        if name.is_empty() {
            return false;
        }

        region.match_indices(name).any(|(at, _)| {
            let before = region[..at].chars().next_back();
            if before.is_some_and(|c| !c.is_whitespace()) {
                return false;
            }
            let rest = region[at + name.len()..].trim_start();
            let Some(value) = rest.strip_prefix('=') else {
                return false;
            };
            matches!(value.trim_start().chars().next(), Some('"' | '\'' | '{'))
        })
    }
}

/// Finds every opening tag of `tag_name` in `text`, left to right.
///
/// The name must be followed by whitespace, `/` or `>`, so `Input` never
/// matches `<InputGroup>`, `<Input.Group>` or `</Input>`. A tag whose end
/// cannot be found is skipped and the scan continues after its name.
pub fn find_tag_occurrences(
    text: &str,
    tag_name: &str,
) -> Result<Vec<TagOccurrence>, TransformError> {
    let pattern = format!(r"<{}[\s/>]", regex::escape(tag_name));
    let regex = Regex::new(&pattern).map_err(|source| TransformError::TagPattern {
        tag: tag_name.to_string(),
        source,
    })?;

    let mut occurrences = Vec::new();
    let mut cursor = 0;

    while let Some(found) = regex.find_at(text, cursor) {
        let name_end = found.start() + 1 + tag_name.len();
        // Quotes in JSX text nested inside an expression (`{<p>Don't</p>}`)
        // are not strings; retry without expression strings before giving up.
        let close = find_tag_end(text, name_end, ExpressionStrings::Quoted)
            .or_else(|| find_tag_end(text, name_end, ExpressionStrings::Ignored));
        let Some(close) = close else {
            tracing::debug!(tag = tag_name, offset = found.start(), "skipping unterminated tag");
            cursor = name_end;
            continue;
        };

        let attributes = Span::from_usize(name_end, close.region_end);
        occurrences.push(TagOccurrence {
            tag_name: SmolStr::new(tag_name),
            name_end: attributes.start,
            attributes,
            self_closing: close.self_closing,
        });
        cursor = close.after;
    }

    Ok(occurrences)
}

struct TagEnd {
    /// Start of `>` or `/>`.
    region_end: usize,
    /// Offset just past `>`.
    after: usize,
    self_closing: bool,
}

/// How quotes inside `{...}` are read.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ExpressionStrings {
    /// Quotes open strings and `//`, `/* */` open comments.
    Quoted,
    /// Only braces count.
    Ignored,
}

fn find_tag_end(text: &str, from: usize, strings: ExpressionStrings) -> Option<TagEnd> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            // Escapes only exist inside expressions; attribute strings are raw.
            if b == b'\\' && depth > 0 {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        let in_code = depth > 0 && strings == ExpressionStrings::Quoted;
        match (b, bytes.get(i + 1)) {
            (b'/', Some(b'/')) if in_code => {
                i = text[i..].find('\n').map_or(bytes.len(), |p| i + p);
                continue;
            }
            (b'/', Some(b'*')) if in_code => {
                i = text[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                continue;
            }
            (b'"' | b'\'', _) if depth == 0 || in_code => quote = Some(b),
            (b'`', _) if in_code => quote = Some(b),
            (b'{', _) => depth += 1,
            (b'}', _) => depth = depth.saturating_sub(1),
            (b'>', _) if depth == 0 => {
                let self_closing = i > from && bytes[i - 1] == b'/';
                return Some(TagEnd {
                    region_end: if self_closing { i - 1 } else { i },
                    after: i + 1,
                    self_closing,
                });
            }
            _ => {}
        }
        i += 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn regions<'a>(text: &'a str, name: &str) -> Vec<(&'a str, bool)> {
        find_tag_occurrences(text, name)
            .unwrap()
            .iter()
            .map(|o| (o.attribute_text(text), o.self_closing))
            .collect()
    }

    #[test]
    fn test_open_and_self_closing() {
        let text = "<div><Button>Click</Button><Button disabled /></div>";
        assert_eq!(
            regions(text, "Button"),
            vec![("", false), (" disabled ", true)]
        );
    }

    #[test]
    fn test_name_end_is_after_tag_name() {
        let text = "x <Input />";
        let occurrences = find_tag_occurrences(text, "Input").unwrap();
        assert_eq!(usize::from(occurrences[0].name_end), 8);
    }

    #[test]
    fn test_longer_names_do_not_match() {
        let text = "<InputGroup><Input.Label /><Input-x /></InputGroup><Input\n/>";
        assert_eq!(regions(text, "Input"), vec![("\n", true)]);
    }

    #[test]
    fn test_expressions_do_not_end_the_tag() {
        let text = r#"<Button onClick={() => go(a > b)} style={{ color: 'red' }} title="a > b">x</Button>"#;
        assert_eq!(
            regions(text, "Button"),
            vec![(
                r#" onClick={() => go(a > b)} style={{ color: 'red' }} title="a > b""#,
                false
            )]
        );
    }

    #[test]
    fn test_template_literal_in_expression() {
        let text = "<Card label={`}>${n}`} />";
        assert_eq!(regions(text, "Card"), vec![(" label={`}>${n}`} ", true)]);
    }

    #[test]
    fn test_multiline_tag() {
        let text = "<Button\n  variant=\"ghost\"\n  size=\"sm\"\n>\nGo</Button>";
        assert_eq!(
            regions(text, "Button"),
            vec![("\n  variant=\"ghost\"\n  size=\"sm\"\n", false)]
        );
    }

    #[test]
    fn test_unterminated_tag_is_skipped() {
        assert!(regions("<Button onClick={x", "Button").is_empty());
        assert_eq!(
            regions("<Button onClick={x\n<Button />", "Button"),
            vec![(" ", true)]
        );
    }

    #[test]
    fn test_comments_in_expressions() {
        let text = "<Button onClick={() => go() /* don't */}>A</Button>\n<Button>B</Button>";
        assert_eq!(
            regions(text, "Button"),
            vec![(" onClick={() => go() /* don't */}", false), ("", false)]
        );

        let text = "<Button onClick={() => {\n  // it's > done\n  go()\n}} />";
        assert_eq!(
            regions(text, "Button"),
            vec![(" onClick={() => {\n  // it's > done\n  go()\n}} ", true)]
        );
    }

    #[test]
    fn test_apostrophe_in_nested_markup() {
        let text = "<A x={<p>Don't</p>} /><A />";
        assert_eq!(
            regions(text, "A"),
            vec![(" x={<p>Don't</p>} ", true), (" ", true)]
        );
    }

    #[test]
    fn test_special_characters_in_name_are_escaped() {
        let text = "<$Icon /><xIcon />";
        assert_eq!(regions(text, "$Icon"), vec![(" ", true)]);
    }

    #[test]
    fn test_has_attribute_forms() {
        let text = r#"<Button theme="light" size = '{1}' onClick={go} data-variant="x" disabled>"#;
        let occurrence = &find_tag_occurrences(text, "Button").unwrap()[0];

        assert!(occurrence.has_attribute(text, "theme"));
        assert!(occurrence.has_attribute(text, "size"));
        assert!(occurrence.has_attribute(text, "onClick"));
        assert!(!occurrence.has_attribute(text, "variant"));
        assert!(!occurrence.has_attribute(text, "disabled"));
        assert!(!occurrence.has_attribute(text, "click"));
    }
}
