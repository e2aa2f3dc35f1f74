//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Adds configured props to imported JSX components.
#[derive(Debug, Parser)]
#[command(name = "inject-props")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Project directory to process
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Path to the configuration file (default: <workspace>/inject-props.json)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Rewrite matched files in place
    #[arg(long, conflicts_with = "out_dir")]
    pub write: bool,

    /// Write transformed files under this directory, mirroring the workspace layout
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Write a `.map` source map next to every written file
    #[arg(long = "source-maps")]
    pub source_maps: bool,

    /// Additional glob patterns to exclude
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Summary format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Log per-file inclusion decisions
    #[arg(long)]
    pub debug: bool,
}

/// Summary format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

impl Args {
    /// Returns true if no file will be written.
    pub fn dry_run(&self) -> bool {
        !self.write && self.out_dir.is_none()
    }
}
