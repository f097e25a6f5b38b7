//! Subcommand implementations

pub(crate) mod eda;
pub(crate) mod run;

use crate::error::{CliError, Result};
use adspend::pipeline::PipelineConfig;
use std::path::Path;

/// Fails with `FileNotFound` unless `path` is an existing file.
pub(crate) fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.to_path_buf()))
    }
}

/// Loads `config` when given, defaults otherwise.
pub(crate) fn load_config(config: Option<&Path>) -> Result<PipelineConfig> {
    match config {
        Some(path) => {
            require_file(path)?;
            Ok(PipelineConfig::from_json_file(path)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}
