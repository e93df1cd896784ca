//! CLI subcommands.

pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use docfields_core::DocfieldsConfig;
use tracing::debug;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docfields")
        .join("config.json")
}

/// Load configuration from an explicit path, the default path, or defaults,
/// then apply environment overrides.
pub fn load_config(path: Option<&str>) -> anyhow::Result<DocfieldsConfig> {
    let config = match path {
        Some(path) => DocfieldsConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                DocfieldsConfig::from_file(&default_path)?
            } else {
                DocfieldsConfig::default()
            }
        }
    };

    Ok(config.with_env_overrides())
}
