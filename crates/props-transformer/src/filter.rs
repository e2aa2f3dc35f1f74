//! File inclusion patterns.

use crate::config::parse_pattern;
use crate::error::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

/// Decides which files enter the transform.
///
/// Patterns are globs or `/regex/flags`; a leading `!` turns one into an
/// exclusion. Exclusions always win, and with no inclusion patterns every
/// file not excluded matches.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Matchers,
    exclude: Matchers,
    /// Directories whose whole contents are excluded (`!dir/**`).
    excluded_dirs: GlobSet,
}

#[derive(Debug, Clone)]
struct Matchers {
    globs: GlobSet,
    regexes: Vec<Regex>,
}

impl Matchers {
    fn is_empty(&self) -> bool {
        self.globs.is_empty() && self.regexes.is_empty()
    }

    fn is_match(&self, path: &str) -> bool {
        self.globs.is_match(path) || self.regexes.iter().any(|re| re.is_match(path))
    }
}

struct MatchersBuilder {
    globs: GlobSetBuilder,
    regexes: Vec<Regex>,
}

impl MatchersBuilder {
    fn new() -> Self {
        Self {
            globs: GlobSetBuilder::new(),
            regexes: Vec::new(),
        }
    }

    fn add(&mut self, pattern: &str) -> Result<(), ConfigError> {
        if let Some(regex) = parse_pattern(pattern)? {
            self.regexes.push(regex);
            return Ok(());
        }
        let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;
        self.globs.add(glob);
        Ok(())
    }

    fn build(self) -> Result<Matchers, ConfigError> {
        let globs = self
            .globs
            .build()
            .map_err(|source| ConfigError::InvalidGlob {
                pattern: String::new(),
                source,
            })?;
        Ok(Matchers {
            globs,
            regexes: self.regexes,
        })
    }
}

impl FileFilter {
    /// Compiles `patterns`.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut include = MatchersBuilder::new();
        let mut exclude = MatchersBuilder::new();
        let mut excluded_dirs = MatchersBuilder::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            match pattern.strip_prefix('!') {
                Some(negated) => {
                    exclude.add(negated)?;
                    if let Some(dir) = negated.strip_suffix("/**").filter(|d| !d.is_empty()) {
                        excluded_dirs.add(dir)?;
                    }
                }
                None if !pattern.is_empty() => include.add(pattern)?,
                None => {}
            }
        }

        Ok(Self {
            include: include.build()?,
            exclude: exclude.build()?,
            excluded_dirs: excluded_dirs.build()?.globs,
        })
    }

    /// Returns true if no file below the directory `dir` can match.
    ///
    /// Only directories named by a `!dir/**` pattern are reported, so a walk
    /// can skip them without testing their files.
    pub fn is_excluded_dir(&self, dir: &str) -> bool {
        let path = dir.replace('\\', "/");
        let path = path.trim_end_matches('/');
        !path.is_empty() && self.excluded_dirs.is_match(path)
    }

    /// Returns true if the file `id` should be processed.
    ///
    /// Backslashes are read as path separators. Query strings appended by
    /// bundlers (`App.tsx?raw`) are not part of the path.
    pub fn is_match(&self, id: &str) -> bool {
        let path = id.split('?').next().unwrap_or(id).replace('\\', "/");
        if self.exclude.is_match(&path) {
            return false;
        }
        self.include.is_empty() || self.include.is_match(&path)
    }
}
