//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Directory name used under the platform data directory.
const APP_DIR_NAME: &str = "GhostType";

/// Get the GhostType base directory.
///
/// `GHOSTTYPE_HOME` wins when set; otherwise the platform data directory
/// (`~/Library/Application Support/GhostType`, `~/.local/share/GhostType`, ...)
/// is used, falling back to `~/.ghosttype`.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::GHOSTTYPE_HOME) {
        return Ok(expand_tilde(&home));
    }
    if let Some(data) = dirs::data_dir() {
        return Ok(data.join(APP_DIR_NAME));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".ghosttype"))
}

/// Get the main config file path (`<base>/ghosttype.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("ghosttype.json5"))
}

/// Get the credentials directory (`<base>/credentials`).
pub fn credentials_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("credentials"))
}

/// Get the encrypted credential file path (`<base>/credentials/secrets.bin`).
pub fn credentials_file() -> Result<PathBuf, ConfigError> {
    Ok(credentials_dir()?.join("secrets.bin"))
}

/// Get the preference file path (`<base>/preferences.json`).
pub fn preferences_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("preferences.json"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand tilde in an already-typed path.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_tilde(s),
        None => path.to_path_buf(),
    }
}
