//! Per-file transformation.

use crate::config::{Options, Rule};
use crate::error::{ConfigError, TransformError};
use crate::filter::FileFilter;
use crate::imports::resolve_imports;
use crate::inject::{compute_edit, PendingEdit};
use crate::rules::match_rules;
use crate::tags::{find_tag_occurrences, TagOccurrence};
use smol_str::SmolStr;
use source_map::{EditBuffer, SourceMap, SourceMapV3};
use std::collections::HashMap;

/// The result of a transform that changed the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// The edited source.
    pub code: String,
    /// Maps positions in `code` back to the original source.
    pub map: SourceMap,
    /// Number of insertions applied.
    pub edits: usize,
}

impl TransformOutput {
    /// Renders the position map as a Source Map v3 document.
    pub fn source_map_v3(&self, file: &str, original: &str) -> SourceMapV3 {
        self.map.to_v3(file, original, &self.code)
    }
}

/// Applies a fixed set of rules to source files.
///
/// The injector never changes after construction and can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Injector {
    options: Options,
    filter: FileFilter,
}

impl Injector {
    /// Builds an injector, compiling the file patterns.
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        let filter = FileFilter::new(&options.patterns)?;
        Ok(Self { options, filter })
    }

    /// Returns the options this injector was built from.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns true if the file `id` should be transformed at all.
    ///
    /// Nothing is included when there are no rules.
    pub fn is_included(&self, id: &str) -> bool {
        let included = !self.options.rules.is_empty() && self.filter.is_match(id);
        if self.options.debug {
            tracing::debug!(file = id, included, "file inclusion");
        }
        included
    }

    /// Returns true if a project walk can skip the directory `dir` entirely.
    pub fn is_excluded_dir(&self, dir: &str) -> bool {
        self.filter.is_excluded_dir(dir)
    }

    /// Transforms `code`, returning `None` when nothing changed.
    ///
    /// Failures are logged and reported as `None`, leaving the file as it was.
    pub fn transform(&self, code: &str, id: &str) -> Option<TransformOutput> {
        match self.try_transform(code) {
            Ok(output) => {
                if let Some(output) = &output {
                    tracing::debug!(file = id, edits = output.edits, "injected props");
                }
                output
            }
            Err(error) => {
                tracing::warn!(file = id, %error, "prop injection failed, leaving file unmodified");
                None
            }
        }
    }

    /// Transforms `code`, surfacing failures instead of swallowing them.
    pub fn try_transform(&self, code: &str) -> Result<Option<TransformOutput>, TransformError> {
        let edits = collect_edits(code, &self.options.rules)?;
        build_outcome(code, &edits)
    }
}

/// Computes every insertion the rules call for in `code`.
///
/// Edits are ordered by rule, then by tag position, which is the order they
/// must be applied in for inserts at the same offset.
pub fn collect_edits(code: &str, rules: &[Rule]) -> Result<Vec<PendingEdit>, TransformError> {
    if rules.is_empty() {
        return Ok(Vec::new());
    }

    let bindings = resolve_imports(code);
    let worklist = match_rules(&bindings, rules);
    let mut occurrences: HashMap<SmolStr, Vec<TagOccurrence>> = HashMap::new();
    let mut edits = Vec::new();

    for (binding, rule) in worklist {
        if !occurrences.contains_key(&binding.local_name) {
            let found = find_tag_occurrences(code, &binding.local_name)?;
            occurrences.insert(binding.local_name.clone(), found);
        }
        let tags = &occurrences[&binding.local_name];
        edits.extend(tags.iter().filter_map(|tag| compute_edit(code, tag, rule)));
    }

    Ok(edits)
}

/// Applies `edits` to `code`.
///
/// No edits means no output at all, which is distinct from an output whose
/// text happens to equal the input.
pub fn build_outcome(
    code: &str,
    edits: &[PendingEdit],
) -> Result<Option<TransformOutput>, TransformError> {
    if edits.is_empty() {
        return Ok(None);
    }

    let mut buffer = EditBuffer::new(code);
    for edit in edits {
        buffer.insert(edit.offset, edit.text.as_str())?;
    }
    if !buffer.has_changed() {
        return Ok(None);
    }

    let edited = buffer.finish();
    Ok(Some(TransformOutput {
        code: edited.text,
        map: edited.map,
        edits: edits.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use source_map::ByteOffset;

    fn injector(rules: Vec<Rule>) -> Injector {
        Injector::new(Options::with_rules(rules)).unwrap()
    }

    #[test]
    fn test_no_rules_includes_nothing() {
        let injector = injector(Vec::new());
        assert!(!injector.is_included("src/App.tsx"));
    }

    #[test]
    fn test_inclusion_uses_patterns() {
        let injector = injector(vec![Rule::new("ui", ["*"], [("a", "1")]).unwrap()]);
        assert!(injector.is_included("src/App.tsx"));
        assert!(!injector.is_included("src/App.ts"));
        assert!(!injector.is_included("node_modules/ui/Button.jsx"));
        assert!(injector.is_excluded_dir("node_modules"));
        assert!(!injector.is_excluded_dir("src"));
    }

    #[test]
    fn test_empty_edits_is_unmodified() {
        assert_eq!(build_outcome("<A />", &[]).unwrap(), None);
    }

    #[test]
    fn test_empty_edit_text_is_unmodified() {
        let edits = vec![PendingEdit {
            offset: ByteOffset::from(2),
            text: String::new(),
        }];
        assert_eq!(build_outcome("<A />", &edits).unwrap(), None);
    }

    #[test]
    fn test_bad_edit_offset_is_an_error() {
        let edits = vec![PendingEdit {
            offset: ByteOffset::from(40),
            text: " a".to_string(),
        }];
        assert!(matches!(
            build_outcome("<A />", &edits),
            Err(TransformError::Edit(_))
        ));
    }

    #[test]
    fn test_same_offset_edits_apply_in_rule_order() {
        let rules = vec![
            Rule::new("ui", ["Button"], [("theme", "\"dark\"")]).unwrap(),
            Rule::new("ui", ["*"], [("size", "\"sm\"")]).unwrap(),
        ];
        let code = "import { Button } from 'ui'\n<Button>x</Button>";
        let output = injector(rules).transform(code, "a.tsx").unwrap();
        assert_eq!(
            output.code,
            "import { Button } from 'ui'\n<Button theme=\"dark\" size=\"sm\">x</Button>"
        );
        assert_eq!(output.edits, 2);
    }

    #[test]
    fn test_duplicate_prop_across_rules_is_injected_twice() {
        let rules = vec![
            Rule::new("ui", ["*"], [("size", "\"sm\"")]).unwrap(),
            Rule::new("ui", ["*"], [("size", "\"lg\"")]).unwrap(),
        ];
        let code = "import { A } from 'ui'\n<A />";
        let output = injector(rules).transform(code, "a.tsx").unwrap();
        assert!(output.code.ends_with("<A size=\"sm\" size=\"lg\" />"));
    }
}
