//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main GhostType configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credential storage settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credential storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Override for the encrypted credential file location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,

    /// Override for the preference file holding presence hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences_file: Option<PathBuf>,

    /// Keep all credentials in memory for this run.
    #[serde(default)]
    pub dry_run: bool,

    /// Preference key prefix for cached presence flags.
    #[serde(default = "default_presence_prefix")]
    pub presence_prefix: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            store_file: None,
            preferences_file: None,
            dry_run: false,
            presence_prefix: default_presence_prefix(),
        }
    }
}

fn default_presence_prefix() -> String {
    "ghosttype.credentials.present".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
