//! RON config loader
//!
//! Loads a `DungeonConfig` from a RON file, with fallback to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{ConfigError, DungeonConfig};

/// File name used in the platform config directory
const CONFIG_FILE: &str = "deepkeys.ron";

/// Errors reading or writing a config file
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "deepkeys", "Deepkeys") {
        proj_dirs.config_dir().join(CONFIG_FILE)
    } else {
        // Fallback to current directory
        PathBuf::from(CONFIG_FILE)
    }
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<DungeonConfig, ConfigFileError> {
    let content = fs::read_to_string(path)?;
    let config: DungeonConfig = ron::from_str(&content)?;
    config.validate()?;

    log::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Load a config file, falling back to defaults if it is missing or broken
pub fn load_or_default(path: &Path) -> DungeonConfig {
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return DungeonConfig::default();
    }

    load_config(path).unwrap_or_else(|e| {
        log::warn!("Failed to load {:?}: {}. Using defaults.", path, e);
        DungeonConfig::default()
    })
}

/// Write the default configuration as pretty RON for easy editing
pub fn export_default_config(path: &Path) -> Result<(), ConfigFileError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let pretty = ron::ser::PrettyConfig::default();
    let ron = ron::ser::to_string_pretty(&DungeonConfig::default(), pretty)?;
    fs::write(path, ron)?;

    log::info!("Wrote default config to {:?}", path);
    Ok(())
}
