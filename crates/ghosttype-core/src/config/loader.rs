//! Configuration loading and persistence.

use super::Config;
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Resolve the config file path, honoring `GHOSTTYPE_CONFIG`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        match env::get_var(vars::GHOSTTYPE_CONFIG) {
            Some(path) => Ok(paths::expand_tilde(&path)),
            None => paths::config_file(),
        }
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let result = match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        };
        match result {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring unreadable configuration: {e}");
                Self::default()
            }
        }
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        crate::fs::write_atomic(path, content.as_bytes(), None)?;
        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let prefix = &self.credentials.presence_prefix;
        if prefix.is_empty() {
            errors.push("credentials.presence_prefix must not be empty".to_string());
        } else if prefix.chars().any(char::is_whitespace) {
            errors.push(format!(
                "credentials.presence_prefix '{}' must not contain whitespace",
                prefix
            ));
        }

        let overrides = [
            ("credentials.store_file", &self.credentials.store_file),
            ("credentials.preferences_file", &self.credentials.preferences_file),
        ];
        for (name, file) in overrides {
            let Some(file) = file else { continue };
            if file.as_os_str().is_empty() {
                errors.push(format!("{} must not be empty when set", name));
            } else if file.file_name().is_none() {
                errors.push(format!("{} '{}' must name a file", name, file.display()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// The encrypted credential file this configuration points at.
    pub fn credentials_file(&self) -> Result<PathBuf, ConfigError> {
        match &self.credentials.store_file {
            Some(file) => Ok(paths::expand_path(file)),
            None => paths::credentials_file(),
        }
    }

    /// The preference file presence hints are kept in.
    pub fn preferences_file(&self) -> Result<PathBuf, ConfigError> {
        match &self.credentials.preferences_file {
            Some(file) => Ok(paths::expand_path(file)),
            None => paths::preferences_file(),
        }
    }
}
