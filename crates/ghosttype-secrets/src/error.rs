//! Error types for credential storage.

use thiserror::Error;

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The credential file exists but is too short, fails authentication,
    /// or does not decrypt to a flat string map.
    #[error("Credential file is corrupted: {0}")]
    CorruptedFile(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key reference: {0}")]
    InvalidKeyRef(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ghosttype_core::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
