//! Main orchestration logic.

use crate::cli::Args;
use crate::config;
use crate::output::{ChangedFile, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use props_transformer::{ConfigError, Injector, TransformOutput};
use rayon::prelude::*;
use std::fs;
use std::io;
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// No configuration file was found.
    #[error("configuration file not found: {0}")]
    #[diagnostic(
        code(inject_props::config_not_found),
        help("create inject-props.json in the workspace or pass --config")
    )]
    ConfigNotFound(Utf8PathBuf),

    /// The configuration file is not valid JSON or has invalid values.
    #[error("invalid configuration in {path}: {source}")]
    #[diagnostic(code(inject_props::invalid_config))]
    InvalidConfig {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The parse error.
        source: serde_json::Error,
    },

    /// A pattern could not be compiled.
    #[error(transparent)]
    #[diagnostic(code(inject_props::invalid_pattern))]
    Config(#[from] ConfigError),

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(inject_props::read_failed))]
    ReadFailed {
        /// The file.
        path: Utf8PathBuf,
        /// The I/O error.
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    #[diagnostic(code(inject_props::write_failed))]
    WriteFailed {
        /// The file.
        path: Utf8PathBuf,
        /// The I/O error.
        source: io::Error,
    },
}

/// A file the injector changed, held in memory until the write phase.
struct TransformedFile {
    relative: Utf8PathBuf,
    source: String,
    output: TransformOutput,
}

/// Runs the transform over every matched file in the workspace.
///
/// Every file is read and transformed before the first one is written.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    let workspace = if args.workspace.is_relative() {
        std::env::current_dir()
            .ok()
            .and_then(|p| Utf8PathBuf::try_from(p).ok())
            .unwrap_or_default()
            .join(&args.workspace)
    } else {
        args.workspace.clone()
    };

    let mut options = config::load(&workspace, args.config.as_deref())?;
    options
        .patterns
        .extend(args.ignore.iter().map(|pattern| format!("!{pattern}")));
    options.debug |= args.debug;
    let injector = Injector::new(options)?;

    let out_dir = args.out_dir.as_ref().map(|dir| {
        if dir.is_relative() {
            workspace.join(dir)
        } else {
            dir.clone()
        }
    });

    let files = collect_files(&workspace, &injector, out_dir.as_deref());
    tracing::debug!(count = files.len(), "matched files");

    let transformed: Vec<TransformedFile> = files
        .par_iter()
        .filter_map(|relative| transform_file(&workspace, &injector, relative))
        .collect();

    let destination = if args.write {
        Some(workspace.as_path())
    } else {
        out_dir.as_deref()
    };
    if let Some(root) = destination {
        transformed
            .par_iter()
            .try_for_each(|file| write_output(root, file, args.source_maps))?;
    }

    let changed = transformed
        .into_iter()
        .map(|file| ChangedFile {
            path: file.relative.to_string(),
            edits: file.output.edits,
        })
        .collect();

    Ok(RunSummary::new(files.len(), changed, args.dry_run()))
}

/// Lists workspace-relative paths the injector accepts, in a stable order.
///
/// Excluded directories and the output directory are not entered.
fn collect_files(
    workspace: &Utf8Path,
    injector: &Injector,
    out_dir: Option<&Utf8Path>,
) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(workspace)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            if out_dir.is_some_and(|dir| entry.path() == dir.as_std_path()) {
                return false;
            }
            let relative = entry.path().strip_prefix(workspace).unwrap_or(entry.path());
            !injector.is_excluded_dir(&relative.to_string_lossy())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter_map(|p| p.strip_prefix(workspace).ok().map(Utf8Path::to_path_buf))
        .filter(|relative| injector.is_included(relative.as_str()))
        .collect();
    files.sort();
    files
}

/// Reads and transforms one file.
///
/// Returns `None` when the file was left unmodified or could not be read.
fn transform_file(
    workspace: &Utf8Path,
    injector: &Injector,
    relative: &Utf8Path,
) -> Option<TransformedFile> {
    let path = workspace.join(relative);
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(error) => {
            tracing::warn!(file = %path, %error, "skipping unreadable file");
            return None;
        }
    };

    let output = injector.transform(&source, relative.as_str())?;
    Some(TransformedFile {
        relative: relative.to_path_buf(),
        source,
        output,
    })
}

fn write_output(
    root: &Utf8Path,
    file: &TransformedFile,
    source_maps: bool,
) -> Result<(), OrchestratorError> {
    let write_failed = |path: &Utf8Path| {
        let path = path.to_path_buf();
        move |source| OrchestratorError::WriteFailed { path, source }
    };

    let destination = root.join(&file.relative);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(write_failed(parent))?;
    }
    fs::write(&destination, &file.output.code).map_err(write_failed(&destination))?;

    if source_maps {
        let map_path = Utf8PathBuf::from(format!("{destination}.map"));
        let mut json = Vec::new();
        file.output
            .source_map_v3(file.relative.as_str(), &file.source)
            .to_writer(&mut json)
            .map_err(|e| write_failed(&map_path)(io::Error::other(e)))?;
        fs::write(&map_path, json).map_err(write_failed(&map_path))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"{
        "rules": [
            { "source": "@/components", "components": ["Button"], "props": { "theme": "\"dark\"" } }
        ]
    }"#;

    const APP: &str = "import { Button } from '@/components'\nexport const App = () => <Button>Go</Button>\n";

    fn setup() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(root.join(config::CONFIG_FILE), CONFIG).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/ui")).unwrap();
        fs::write(root.join("src/App.tsx"), APP).unwrap();
        fs::write(root.join("src/Plain.tsx"), "export const x = 1;\n").unwrap();
        fs::write(root.join("src/util.ts"), APP).unwrap();
        fs::write(root.join("node_modules/ui/Button.jsx"), APP).unwrap();
        (dir, root)
    }

    fn args(root: &Utf8Path) -> Args {
        Args {
            workspace: root.to_path_buf(),
            config: None,
            write: false,
            out_dir: None,
            source_maps: false,
            ignore: Vec::new(),
            output: OutputFormat::Human,
            debug: false,
        }
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let (_dir, root) = setup();
        let summary = run(&args(&root)).unwrap();

        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.changed.len(), 1);
        assert_eq!(summary.changed[0].path, "src/App.tsx");
        assert!(summary.dry_run);
        assert_eq!(fs::read_to_string(root.join("src/App.tsx")).unwrap(), APP);
    }

    #[test]
    fn test_write_in_place_with_source_map() {
        let (_dir, root) = setup();
        let args = Args {
            write: true,
            source_maps: true,
            ..args(&root)
        };
        run(&args).unwrap();

        let written = fs::read_to_string(root.join("src/App.tsx")).unwrap();
        assert!(written.contains("<Button theme=\"dark\">Go</Button>"));
        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(root.join("src/App.tsx.map")).unwrap())
                .unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["sources"][0], "src/App.tsx");

        // Unchanged files are never rewritten.
        assert!(!root.join("src/Plain.tsx.map").exists());
    }

    #[test]
    fn test_out_dir_mirrors_layout() {
        let (_dir, root) = setup();
        let args = Args {
            out_dir: Some(Utf8PathBuf::from("build")),
            ..args(&root)
        };
        run(&args).unwrap();

        let written = fs::read_to_string(root.join("build/src/App.tsx")).unwrap();
        assert!(written.contains("theme=\"dark\""));
        assert!(!root.join("build/src/Plain.tsx").exists());
        assert_eq!(fs::read_to_string(root.join("src/App.tsx")).unwrap(), APP);
    }

    #[test]
    fn test_ignore_patterns_exclude_files() {
        let (_dir, root) = setup();
        let args = Args {
            ignore: vec!["src/App.tsx".to_string()],
            ..args(&root)
        };
        let summary = run(&args).unwrap();
        assert_eq!(summary.file_count, 1);
        assert!(summary.changed.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let (_dir, root) = setup();
        fs::write(root.join("src/Bad.tsx"), b"\xff\xfe<Button />\n").unwrap();
        let args = Args {
            write: true,
            ..args(&root)
        };

        let summary = run(&args).unwrap();
        assert_eq!(summary.file_count, 3);
        assert_eq!(summary.changed.len(), 1);
        assert_eq!(summary.changed[0].path, "src/App.tsx");
        assert!(fs::read_to_string(root.join("src/App.tsx"))
            .unwrap()
            .contains("theme=\"dark\""));
        assert_eq!(
            fs::read(root.join("src/Bad.tsx")).unwrap(),
            b"\xff\xfe<Button />\n"
        );
    }

    #[test]
    fn test_walk_skips_excluded_dirs_and_out_dir() {
        let (_dir, root) = setup();
        fs::create_dir_all(root.join("packages/ui/node_modules/x")).unwrap();
        fs::write(root.join("packages/ui/node_modules/x/A.tsx"), APP).unwrap();
        let injector = Injector::new(config::load(&root, None).unwrap()).unwrap();

        let files = collect_files(&root, &injector, None);
        assert_eq!(
            files,
            vec![
                Utf8PathBuf::from("src/App.tsx"),
                Utf8PathBuf::from("src/Plain.tsx")
            ]
        );

        // A second run into the same out-dir does not pick up its own output.
        let args = Args {
            out_dir: Some(Utf8PathBuf::from("build")),
            ..args(&root)
        };
        run(&args).unwrap();
        assert!(root.join("build/src/App.tsx").exists());
        let summary = run(&args).unwrap();
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.changed.len(), 1);
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            run(&args(&root)),
            Err(OrchestratorError::ConfigNotFound(_))
        ));
    }
}
