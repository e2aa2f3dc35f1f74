//! Configuration loading.

use crate::orchestrator::OrchestratorError;
use camino::{Utf8Path, Utf8PathBuf};
use props_transformer::Options;
use std::fs;

/// File looked up in the workspace when `--config` is not given.
pub const CONFIG_FILE: &str = "inject-props.json";

/// Loads the options for a run.
///
/// An explicit path must exist. Without one, `inject-props.json` in the
/// workspace is used.
pub fn load(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Options, OrchestratorError> {
    let path = match explicit {
        Some(path) if path.is_relative() => workspace.join(path),
        Some(path) => path.to_path_buf(),
        None => workspace.join(CONFIG_FILE),
    };

    if !path.exists() {
        return Err(OrchestratorError::ConfigNotFound(path));
    }
    parse(&path)
}

fn parse(path: &Utf8PathBuf) -> Result<Options, OrchestratorError> {
    let content = fs::read_to_string(path).map_err(|source| OrchestratorError::ReadFailed {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| OrchestratorError::InvalidConfig {
        path: path.clone(),
        source,
    })
}
