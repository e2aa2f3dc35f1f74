//! Rule matching against resolved imports.

use crate::config::Rule;
use crate::imports::ImportBinding;

/// Pairs every binding with every rule that applies to it.
///
/// Pairs are ordered by rule, then by binding, so edits derived from them
/// follow the configured rule order. A binding may appear under several
/// rules.
pub fn match_rules<'b, 'r>(
    bindings: &'b [ImportBinding],
    rules: &'r [Rule],
) -> Vec<(&'b ImportBinding, &'r Rule)> {
    rules
        .iter()
        .flat_map(|rule| {
            bindings
                .iter()
                .filter(move |binding| rule.applies_to(binding))
                .map(move |binding| (binding, rule))
        })
        .collect()
}
