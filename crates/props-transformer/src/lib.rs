//! Component prop injection for JSX-like sources.
//!
//! Given a file's text, this crate finds components imported from configured
//! module paths and adds the configured props to every opening tag that does
//! not already declare them. It handles:
//! - Resolving `import` declarations, including aliases and default imports
//! - Matching imports against rules by module path and component name
//! - Locating opening tags and their attribute regions
//! - Recording insertions and building a source map for the edited text
//!
//! # Example
//!
//! ```
//! use props_transformer::{Injector, Options, Rule};
//!
//! let rule = Rule::new("@/components", ["Button"], [("theme", "\"dark\"")]).unwrap();
//! let injector = Injector::new(Options::with_rules(vec![rule])).unwrap();
//!
//! let source = "import { Button } from '@/components'\nconst App = () => <Button>Go</Button>\n";
//! let output = injector.transform(source, "src/App.tsx").unwrap();
//! assert!(output.code.contains("<Button theme=\"dark\">Go</Button>"));
//! ```

mod config;
mod error;
mod filter;
mod imports;
mod inject;
mod rules;
mod tags;
mod transform;

pub use config::{ComponentMatcher, Options, Rule, SourceMatcher, DEFAULT_PATTERNS};
pub use error::{ConfigError, TransformError};
pub use filter::FileFilter;
pub use imports::{resolve_imports, ImportBinding, ImportKind};
pub use inject::{compute_edit, format_prop, PendingEdit};
pub use rules::match_rules;
pub use tags::{find_tag_occurrences, TagOccurrence};
pub use transform::{build_outcome, collect_edits, Injector, TransformOutput};
