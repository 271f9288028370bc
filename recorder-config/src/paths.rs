use std::path::PathBuf;

use crate::error::ConfigError;

/// Get XDG config directory for camrec
/// Returns ~/.config/camrec or $XDG_CONFIG_HOME/camrec
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|p| p.join("camrec"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Get default config file path
/// Returns ~/.config/camrec/recorder.toml
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("recorder.toml"))
}
