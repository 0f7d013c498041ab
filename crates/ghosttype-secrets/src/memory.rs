//! In-memory secret store for dry runs and tests.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::store::{count_non_empty, validate_key_ref, SecretMap, SecretStore};
use crate::types::{ReadPolicy, RepairReport, StoreBackend};

static SHARED: OnceLock<Arc<Mutex<SecretMap>>> = OnceLock::new();

/// A [`SecretStore`] that never touches disk.
///
/// Handles from [`DryRunStore::shared`] all see one process-wide map, the
/// same way every live handle sees one file. [`DryRunStore::isolated`] gives
/// a private map for tests that must not observe each other.
#[derive(Clone)]
pub struct DryRunStore {
    entries: Arc<Mutex<SecretMap>>,
}

impl DryRunStore {
    /// Handle onto the process-wide simulated store.
    pub fn shared() -> Self {
        let entries = SHARED.get_or_init(|| Arc::new(Mutex::new(SecretMap::new())));
        Self {
            entries: Arc::clone(entries),
        }
    }

    /// A store with its own private map.
    pub fn isolated() -> Self {
        Self {
            entries: Arc::new(Mutex::new(SecretMap::new())),
        }
    }

    fn report(&self) -> RepairReport {
        RepairReport::new(StoreBackend::DryRun, None)
    }
}

impl Default for DryRunStore {
    fn default() -> Self {
        Self::shared()
    }
}

impl SecretStore for DryRunStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::DryRun
    }

    fn get(&self, key_ref: &str, _policy: ReadPolicy) -> Result<Option<String>> {
        validate_key_ref(key_ref)?;
        Ok(self.entries.lock().get(key_ref).cloned())
    }

    fn set(&self, key_ref: &str, value: &str) -> Result<()> {
        validate_key_ref(key_ref)?;
        self.entries
            .lock()
            .insert(key_ref.to_string(), value.to_string());
        debug!(key_ref, "stored secret (dry run)");
        Ok(())
    }

    fn delete(&self, key_ref: &str) -> Result<()> {
        validate_key_ref(key_ref)?;
        self.entries.lock().remove(key_ref);
        Ok(())
    }

    fn delete_all(&self) -> RepairReport {
        self.entries.lock().clear();
        let mut report = self.report();
        report.push_guidance("Dry-run credentials cleared; nothing on disk was touched.");
        report
    }

    fn self_check(&self) -> RepairReport {
        let mut report = self.report();
        report.found_current_items = count_non_empty(&self.entries.lock());
        report.push_guidance("Dry-run mode: credentials are kept in memory only.");
        report
    }

    fn saved_secret_count(&self) -> usize {
        count_non_empty(&self.entries.lock())
    }
}
