//! Error types.

use source_map::EditError;
use thiserror::Error;

/// An invalid configuration value. Reported once, when the injector is built.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A `/pattern/flags` value did not compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// The regex compile error.
        #[source]
        source: regex::Error,
    },

    /// A glob in `patterns` did not compile.
    #[error("invalid glob `{pattern}`: {source}")]
    InvalidGlob {
        /// The glob as written.
        pattern: String,
        /// The globset error.
        #[source]
        source: globset::Error,
    },

    /// An empty string where a source or component name was expected.
    #[error("empty {field} matcher")]
    EmptyMatcher {
        /// Which field was empty (`source` or `component`).
        field: &'static str,
    },
}

/// A failure while transforming a single file.
///
/// [`crate::Injector::transform`] logs these and leaves the file unmodified.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The tag search pattern for a component could not be built.
    #[error("cannot build tag pattern for <{tag}>: {source}")]
    TagPattern {
        /// The component name.
        tag: String,
        /// The regex compile error.
        #[source]
        source: regex::Error,
    },

    /// An edit could not be recorded.
    #[error(transparent)]
    Edit(#[from] EditError),
}
