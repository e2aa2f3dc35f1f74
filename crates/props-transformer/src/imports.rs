//! Import declaration scanning.
//!
//! This is a text-level scan, not a parse: it recognizes the static
//! `import ... from "path"` forms a component can arrive through and ignores
//! everything else.

use regex::Regex;
use smol_str::SmolStr;
use std::sync::LazyLock;

/// How a name was imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import Name from "..."`
    Default,
    /// `import { Name } from "..."` or `import { Name as Alias } from "..."`
    Named,
}

/// A local identifier bound by an import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// The module path as written in the declaration.
    pub module_path: String,
    /// The name used in this file.
    pub local_name: SmolStr,
    /// The name the module exports; equals `local_name` unless aliased.
    pub original_name: SmolStr,
    /// Default or named import.
    pub kind: ImportKind,
}

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    // The clause may span lines; quotes and `;` never appear inside one. A
    // declaration may directly follow `<script>` in single-file components.
    Regex::new(
        r#"(?:^|[;\n>])[ \t]*import\b\s*(?P<clause>[^;'"]*?)\s*\bfrom\s*(?:"(?P<dq>[^"\n]*)"|'(?P<sq>[^'\n]*)')"#,
    )
    .expect("import pattern is valid")
});

/// Resolves every component-capable binding imported by `text`, in
/// declaration order.
///
/// Comments are ignored. A declaration or specifier that cannot be understood
/// is skipped; the rest of the file is still scanned.
pub fn resolve_imports(text: &str) -> Vec<ImportBinding> {
    let code = blank_comments(text);
    let mut bindings = Vec::new();

    for caps in IMPORT_RE.captures_iter(&code) {
        let Some(path) = caps.name("dq").or_else(|| caps.name("sq")) else {
            continue;
        };
        let clause = caps.name("clause").map_or("", |m| m.as_str());
        parse_clause(clause, path.as_str(), &mut bindings);
    }

    bindings
}

fn parse_clause(clause: &str, module_path: &str, out: &mut Vec<ImportBinding>) {
    let clause = clause.trim();

    // `import type { A } from` binds nothing renderable.
    if let Some(rest) = clause.strip_prefix("type") {
        if rest.starts_with(char::is_whitespace) || rest.starts_with('{') {
            return;
        }
    }

    let (head, named) = match clause.find('{') {
        Some(open) => {
            let Some(close) = clause[open..].find('}') else {
                return;
            };
            (&clause[..open], Some(&clause[open + 1..open + close]))
        }
        None => (clause, None),
    };

    // `Default`, `Default,` or `Default, * as ns`; namespaces bind nothing.
    let default = head.split(',').next().map_or("", str::trim);
    if is_identifier(default) {
        out.push(ImportBinding {
            module_path: module_path.to_string(),
            local_name: SmolStr::new(default),
            original_name: SmolStr::new(default),
            kind: ImportKind::Default,
        });
    }

    let Some(named) = named else {
        return;
    };
    for specifier in named.split(',') {
        if let Some((original, local)) = parse_specifier(specifier) {
            out.push(ImportBinding {
                module_path: module_path.to_string(),
                local_name: SmolStr::new(local),
                original_name: SmolStr::new(original),
                kind: ImportKind::Named,
            });
        }
    }
}

/// Splits `original as local` or `name`. Returns `None` for type-only or
/// malformed specifiers.
fn parse_specifier(specifier: &str) -> Option<(&str, &str)> {
    let tokens: Vec<&str> = specifier.split_whitespace().collect();
    let (original, local) = match tokens.as_slice() {
        [name] => (*name, *name),
        ["type", ..] => return None,
        [original, "as", local] => (unquote(original), *local),
        _ => return None,
    };
    (is_identifier(local) && !original.is_empty()).then_some((original, local))
}

/// Arbitrary module namespace names: `import { "a-b" as ab }`.
fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .or_else(|| name.strip_prefix('\'').and_then(|n| n.strip_suffix('\'')))
        .unwrap_or(name)
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Replaces comment text with spaces, keeping byte offsets and newlines.
///
/// Quoted strings end at a newline so that apostrophes in markup text do not
/// swallow the rest of the file.
fn blank_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut string_delim: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(delim) = string_delim {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == delim || (b == b'\n' && delim != b'`') {
                string_delim = None;
            }
            i += 1;
            continue;
        }

        match (b, bytes.get(i + 1)) {
            (b'/', Some(b'/')) => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            (b'/', Some(b'*')) => {
                let end = text[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                for byte in &mut out[i..end] {
                    if *byte != b'\n' {
                        *byte = b' ';
                    }
                }
                i = end;
            }
            (b'"' | b'\'' | b'`', _) => {
                string_delim = Some(b);
                i += 1;
            }
            _ => i += 1,
        }
    }

    // Only whole comment bodies were replaced, each by ASCII spaces.
    String::from_utf8(out).unwrap_or_else(|_| text.to_string())
}
