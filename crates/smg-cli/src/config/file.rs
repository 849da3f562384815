use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Contents of an `smg` TOML config file. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    /// Fictive temperature used when `--tg` is not given.
    pub tg: Option<f64>,
    pub fit: Option<FileFitConfig>,
}

/// The `[fit]` table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileFitConfig {
    pub iterations: Option<usize>,
    pub temperature: Option<f64>,
    pub step_size: Option<f64>,
    pub interval: Option<usize>,
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    pub seed: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
