//! Encrypted credential storage for GhostType.
//!
//! API keys are kept in a single AES-256-GCM sealed file whose key is
//! derived from the machine identifier, so no OS secret manager is needed.
//! [`CredentialService`] is the entry point for application code; a
//! [`CredentialRegistry`] decides at startup whether it talks to the file
//! or to an in-memory dry-run store.

pub mod crypto;
pub mod error;
pub mod machine;
pub mod memory;
pub mod presence;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;

pub use crypto::EncryptionKey;
pub use error::{Result, SecretError};
pub use memory::DryRunStore;
pub use presence::PresenceCache;
pub use registry::{CredentialRegistry, RegistryOverride, StoreMode};
pub use service::CredentialService;
pub use store::{EncryptedFileStore, SecretStore};
pub use types::{
    CredentialKey, DecryptedSecret, PresenceHint, ReadPolicy, RepairReport, RuntimeIdentity,
    StoreBackend,
};
