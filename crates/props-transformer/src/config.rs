//! Injection rules and transformer options.

use crate::error::ConfigError;
use crate::imports::{ImportBinding, ImportKind};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer};
use smol_str::SmolStr;

/// File patterns used when the configuration does not name any.
///
/// Entries starting with `!` exclude.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "**/*.{vue,jsx,tsx,svelte,mdx}",
    "!**/node_modules/**",
    "!**/dist/**",
    "!**/.git/**",
];

/// Flags a pattern literal may carry.
const PATTERN_FLAGS: &str = "imsxguyd";

/// Parses a `/body/flags` pattern literal.
///
/// Returns `Ok(None)` when `text` is not written as a pattern literal. Text
/// whose trailing part holds anything but known flags (for example the glob
/// `/src/**/*.tsx` or the path `/home/app/src`) is not a pattern literal.
pub(crate) fn parse_pattern(text: &str) -> Result<Option<Regex>, ConfigError> {
    let Some(rest) = text.strip_prefix('/') else {
        return Ok(None);
    };
    let Some(close) = rest.rfind('/') else {
        return Ok(None);
    };
    let (body, flags) = (&rest[..close], &rest[close + 1..]);
    if body.is_empty() || !flags.chars().all(|c| PATTERN_FLAGS.contains(c)) {
        return Ok(None);
    }

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            // Stateful or encoding flags have no effect on a single test.
            _ => &mut builder,
        };
    }

    builder
        .build()
        .map(Some)
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: text.to_string(),
            source,
        })
}

/// Matches the module path of an import declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub enum SourceMatcher {
    /// Exact module path. Characters such as `.` or `*` have no special meaning.
    Literal(String),
    /// Pattern searched for in the module path.
    Pattern(Regex),
}

impl SourceMatcher {
    /// Returns true if `module_path` satisfies this matcher.
    pub fn is_match(&self, module_path: &str) -> bool {
        match self {
            Self::Literal(path) => path == module_path,
            Self::Pattern(regex) => regex.is_match(module_path),
        }
    }
}

impl TryFrom<String> for SourceMatcher {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConfigError::EmptyMatcher { field: "source" });
        }
        Ok(match parse_pattern(&value)? {
            Some(regex) => Self::Pattern(regex),
            None => Self::Literal(value),
        })
    }
}

/// Matches the exported name of an imported component.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub enum ComponentMatcher {
    /// `*`: every imported name.
    Any,
    /// Exact exported name. `default` also matches default imports.
    Literal(SmolStr),
    /// Pattern searched for in the exported name.
    Pattern(Regex),
}

impl ComponentMatcher {
    /// Returns true if `binding` satisfies this matcher.
    ///
    /// Names are compared by what the module exports, not by the local alias.
    pub fn matches(&self, binding: &ImportBinding) -> bool {
        match self {
            Self::Any => true,
            Self::Literal(name) => {
                *name == binding.original_name
                    || (name == "default" && binding.kind == ImportKind::Default)
            }
            Self::Pattern(regex) => regex.is_match(&binding.original_name),
        }
    }
}

impl TryFrom<String> for ComponentMatcher {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConfigError::EmptyMatcher { field: "component" });
        }
        if value == "*" {
            return Ok(Self::Any);
        }
        Ok(match parse_pattern(&value)? {
            Some(regex) => Self::Pattern(regex),
            None => Self::Literal(SmolStr::new(value)),
        })
    }
}

/// Binds a module path and component names to the props injected into them.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// Which import declarations the rule applies to.
    pub source: SourceMatcher,
    /// Which imported names the rule applies to. Any match is enough.
    pub components: Vec<ComponentMatcher>,
    /// Prop name to value expression, in injection order.
    #[serde(deserialize_with = "deserialize_props")]
    pub props: IndexMap<String, String>,
}

impl Rule {
    /// Builds a rule from string matchers, parsing `/pattern/flags` and `*`
    /// the same way the configuration file does.
    pub fn new<C, P, K, V>(source: &str, components: C, props: P) -> Result<Self, ConfigError>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = SourceMatcher::try_from(source.to_string())?;
        let components = components
            .into_iter()
            .map(|c| ComponentMatcher::try_from(c.as_ref().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        let props = props
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Ok(Self {
            source,
            components,
            props,
        })
    }

    /// Returns true if the rule applies to `binding`.
    pub fn applies_to(&self, binding: &ImportBinding) -> bool {
        self.source.is_match(&binding.module_path)
            && self.components.iter().any(|m| m.matches(binding))
    }
}

/// A prop value as written in the configuration file.
///
/// Booleans and numbers become the equivalent expression source.
#[derive(Deserialize)]
#[serde(untagged)]
enum PropValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl From<PropValue> for String {
    fn from(value: PropValue) -> Self {
        match value {
            PropValue::Text(text) => text,
            PropValue::Bool(b) => b.to_string(),
            PropValue::Int(n) => n.to_string(),
            PropValue::Float(n) => n.to_string(),
        }
    }
}

fn deserialize_props<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, PropValue>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_patterns<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Transformer options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Glob or `/regex/` file patterns; a leading `!` excludes.
    #[serde(
        default = "default_patterns",
        alias = "pattern",
        deserialize_with = "deserialize_patterns"
    )]
    pub patterns: Vec<String>,

    /// Rules, applied in order.
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Log per-file inclusion decisions.
    #[serde(default)]
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
            rules: Vec::new(),
            debug: false,
        }
    }
}

impl Options {
    /// Default patterns with the given rules.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }
}
