//! Shared fixtures for the GhostType integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ghosttype_core::config::CredentialsConfig;
use ghosttype_core::Preferences;
use ghosttype_secrets::{CredentialService, EncryptedFileStore, EncryptionKey, PresenceCache};

/// A file-backed service rooted in `dir`, with its own preferences file.
pub struct FileFixture {
    pub store_path: PathBuf,
    pub prefs_path: PathBuf,
    pub key: EncryptionKey,
}

impl FileFixture {
    pub fn new(dir: &Path) -> Self {
        Self {
            store_path: dir.join("credentials").join("secrets.bin"),
            prefs_path: dir.join("preferences.json"),
            key: EncryptionKey::random(),
        }
    }

    /// Build a fresh service over the fixture's files. Calling this twice
    /// simulates an application restart.
    pub fn service(&self) -> CredentialService {
        self.service_with_key(self.key.clone())
    }

    /// Same files, different key, as if the machine identity changed.
    pub fn service_with_key(&self, key: EncryptionKey) -> CredentialService {
        let store = EncryptedFileStore::new(&self.store_path, key);
        let prefs = Preferences::open(&self.prefs_path);
        CredentialService::new(
            Arc::new(store),
            PresenceCache::new(Arc::new(prefs), CredentialsConfig::default().presence_prefix),
        )
    }
}
