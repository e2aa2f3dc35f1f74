//! Run summary formatting.

use crate::cli::OutputFormat;
use serde::Serialize;

/// A file that received injected props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    /// Workspace-relative path.
    pub path: String,
    /// Number of insertions.
    pub edits: usize,
}

/// Summary of a run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Number of files matched by the patterns.
    pub file_count: usize,
    /// Files that were (or would be) changed, sorted by path.
    pub changed: Vec<ChangedFile>,
    /// Total number of edited tags.
    pub edit_count: usize,
    /// True when nothing was written.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a summary from the changed files of a run.
    pub fn new(file_count: usize, changed: Vec<ChangedFile>, dry_run: bool) -> Self {
        let edit_count = changed.iter().map(|file| file.edits).sum();
        Self {
            file_count,
            changed,
            edit_count,
            dry_run,
        }
    }

    /// Formats the summary for stdout.
    pub fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.format_human(),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(self).unwrap_or_default();
                json.push('\n');
                json
            }
        }
    }

    fn format_human(&self) -> String {
        let mut output = String::new();
        for file in &self.changed {
            output.push_str(&format!(
                "{} ({} {})\n",
                file.path,
                file.edits,
                plural(file.edits, "tag", "tags")
            ));
        }

        let verb = if self.dry_run {
            "would update"
        } else {
            "updated"
        };
        output.push_str(&format!(
            "====================================\ninject-props {} {} {} in {} of {} {}\n",
            verb,
            self.edit_count,
            plural(self.edit_count, "tag", "tags"),
            self.changed.len(),
            self.file_count,
            plural(self.file_count, "file", "files"),
        ));
        output
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(dry_run: bool) -> RunSummary {
        RunSummary::new(
            5,
            vec![
                ChangedFile {
                    path: "src/App.tsx".to_string(),
                    edits: 3,
                },
                ChangedFile {
                    path: "src/Nav.tsx".to_string(),
                    edits: 1,
                },
            ],
            dry_run,
        )
    }

    #[test]
    fn test_edit_count() {
        assert_eq!(summary(true).edit_count, 4);
    }

    #[test]
    fn test_format_human() {
        let output = summary(false).format(OutputFormat::Human);
        assert!(output.contains("src/App.tsx (3 tags)"));
        assert!(output.contains("src/Nav.tsx (1 tag)"));
        assert!(output.contains("inject-props updated 4 tags in 2 of 5 files"));
    }

    #[test]
    fn test_format_human_dry_run() {
        let output = RunSummary::new(1, Vec::new(), true).format(OutputFormat::Human);
        assert_eq!(
            output,
            "====================================\ninject-props would update 0 tags in 0 of 1 file\n"
        );
    }

    #[test]
    fn test_format_json() {
        let output = summary(true).format(OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["fileCount"], 5);
        assert_eq!(json["editCount"], 4);
        assert_eq!(json["dryRun"], true);
        assert_eq!(json["changed"][0]["path"], "src/App.tsx");
    }
}
