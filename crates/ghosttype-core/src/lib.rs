//! # ghosttype-core
//!
//! Core utilities shared by the GhostType crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the config file
//! - **Paths**: Per-user application data locations
//! - **Preferences**: Small process-wide flags that are not security-sensitive
//! - **Utilities**: Environment handling and atomic file publishing

pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod paths;
pub mod preferences;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;
pub use preferences::Preferences;
