//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use idex_core::IdexConfig;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idex")
        .join("config.json")
}

/// Load the configuration named on the command line, else the user
/// configuration file if one exists, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<IdexConfig> {
    if let Some(path) = config_path {
        return Ok(IdexConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(IdexConfig::from_file(&path)?)
    } else {
        Ok(IdexConfig::default())
    }
}
