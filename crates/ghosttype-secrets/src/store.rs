//! Secret storage backends.
//!
//! Defines the [`SecretStore`] trait and provides [`EncryptedFileStore`], which
//! keeps every secret in one AES-256-GCM sealed file. The in-memory variant
//! lives in [`crate::memory`].

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::crypto::{self, EncryptionKey, MIN_BLOB_LEN};
use crate::error::{Result, SecretError};
use crate::machine;
use crate::types::{ReadPolicy, RepairReport, StoreBackend};

/// Maximum allowed length for a key reference.
const MAX_KEY_REF_LEN: usize = 128;

const FILE_MODE: u32 = 0o600;
#[cfg_attr(not(unix), allow(dead_code))]
const DIR_MODE: u32 = 0o700;

const GUIDANCE_CORRUPTED: &str =
    "The credential file may be corrupted. Reset credentials and re-enter your API keys.";
const GUIDANCE_PERMISSIONS: &str =
    "Restrict the credential file to your user (chmod 600) and its folder to chmod 700.";

/// The decrypted contents of a store: key reference to secret value.
pub type SecretMap = BTreeMap<String, String>;

/// Storage capability shared by the file-backed and in-memory stores.
///
/// Every call is blocking and runs as one exclusive operation on the store.
pub trait SecretStore: Send + Sync {
    /// Which variant this is.
    fn backend(&self) -> StoreBackend;

    /// Read one value.
    fn get(&self, key_ref: &str, policy: ReadPolicy) -> Result<Option<String>>;

    /// Insert or replace one value.
    fn set(&self, key_ref: &str, value: &str) -> Result<()>;

    /// Remove one value. Removing an absent key succeeds.
    fn delete(&self, key_ref: &str) -> Result<()>;

    /// Remove everything. Never fails; problems end up in the report.
    fn delete_all(&self) -> RepairReport;

    /// Describe the store's health. Never fails.
    fn self_check(&self) -> RepairReport;

    /// Number of non-empty values; 0 when the store cannot be read.
    fn saved_secret_count(&self) -> usize;
}

/// Validate that a key reference contains only safe characters.
///
/// Allowed: ASCII alphanumeric, underscore, hyphen, dot. Max length 128.
pub(crate) fn validate_key_ref(key_ref: &str) -> Result<()> {
    if key_ref.is_empty() {
        return Err(SecretError::InvalidKeyRef(
            "key reference must not be empty".to_string(),
        ));
    }
    if key_ref.len() > MAX_KEY_REF_LEN {
        return Err(SecretError::InvalidKeyRef(format!(
            "key reference exceeds maximum length of {MAX_KEY_REF_LEN} characters"
        )));
    }
    if !key_ref
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(SecretError::InvalidKeyRef(format!(
            "key reference contains invalid characters (allowed: alphanumeric, '_', '-', '.'): {key_ref}"
        )));
    }
    Ok(())
}

pub(crate) fn count_non_empty(map: &SecretMap) -> usize {
    map.values().filter(|v| !v.trim().is_empty()).count()
}

/// A single-file encrypted secret store.
///
/// The file holds `nonce || ciphertext || tag` of a JSON object with sorted
/// keys. It is created on the first successful save, replaced atomically on
/// every later save, and removed by [`SecretStore::delete_all`].
pub struct EncryptedFileStore {
    path: PathBuf,
    key: EncryptionKey,
    // Held across every load/mutate/save sequence.
    op_lock: Mutex<()>,
}

impl EncryptedFileStore {
    /// Create a store for `path` sealed with `key`.
    pub fn new(path: impl Into<PathBuf>, key: EncryptionKey) -> Self {
        Self {
            path: path.into(),
            key,
            op_lock: Mutex::new(()),
        }
    }

    /// Create a store at `path` using this machine's derived key.
    pub fn for_machine(path: impl Into<PathBuf>) -> Self {
        Self::new(path, machine::machine_key())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a non-empty value is stored under `key_ref`.
    pub fn contains(&self, key_ref: &str) -> bool {
        matches!(self.get(key_ref, ReadPolicy::NoUserInteraction), Ok(Some(v)) if !v.trim().is_empty())
    }

    /// Read and decrypt the whole map. A missing file is an empty map.
    fn load(&self) -> Result<SecretMap> {
        let blob = match fs::read(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SecretMap::new()),
            Err(e) => return Err(e.into()),
        };

        if blob.len() < MIN_BLOB_LEN {
            return Err(SecretError::CorruptedFile(format!(
                "file is {} bytes, shorter than the minimum of {MIN_BLOB_LEN}",
                blob.len()
            )));
        }

        let plaintext = crypto::open(&self.key, &blob)
            .map_err(|e| SecretError::CorruptedFile(e.to_string()))?;

        serde_json::from_slice::<SecretMap>(&plaintext)
            .map_err(|e| SecretError::CorruptedFile(format!("not a string map: {e}")))
    }

    /// Load for a write: a corrupted file counts as empty so it gets
    /// replaced by the save that follows. The flag reports whether that
    /// happened.
    fn load_for_write(&self) -> Result<(SecretMap, bool)> {
        match self.load() {
            Ok(map) => Ok((map, false)),
            Err(SecretError::CorruptedFile(reason)) => {
                warn!(path = %self.path.display(), "overwriting corrupted credential file: {reason}");
                Ok((SecretMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    /// Seal `map` and publish it atomically.
    fn save(&self, map: &SecretMap) -> Result<()> {
        // BTreeMap serializes in key order, so equal maps give equal plaintext.
        let plaintext = zeroize::Zeroizing::new(serde_json::to_vec(map)?);
        let blob = crypto::seal(&self.key, &plaintext)?;

        self.ensure_dir();
        ghosttype_core::fs::write_atomic(&self.path, &blob, Some(FILE_MODE))?;
        if let Err(e) = ghosttype_core::fs::set_mode(&self.path, FILE_MODE) {
            warn!(path = %self.path.display(), "could not restrict credential file permissions: {e}");
        }

        debug!(path = %self.path.display(), entries = map.len(), "saved credential file");
        Ok(())
    }

    /// Create the containing directory and strip group/other access from it.
    /// Failures are logged; the write that follows reports its own error if
    /// the directory is unusable.
    fn ensure_dir(&self) {
        let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) else {
            return;
        };
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(path = %dir.display(), "could not create credential directory: {e}");
            return;
        }
        if let Err(e) = restrict_dir(dir) {
            warn!(path = %dir.display(), "could not restrict credential directory permissions: {e}");
        }
    }

    fn report(&self) -> RepairReport {
        RepairReport::new(StoreBackend::File, Some(self.path.clone()))
    }

    /// Inspect the file and the map. Caller holds `op_lock`.
    fn check_locked(&self) -> RepairReport {
        let mut report = self.report();

        match self.load() {
            Ok(map) => {
                report.found_current_items = count_non_empty(&map);
                if !self.path.exists() {
                    report.push_guidance("No credentials are saved yet.");
                }
            }
            Err(SecretError::CorruptedFile(reason)) => {
                report.fail(format!("Credential file could not be read: {reason}"), GUIDANCE_CORRUPTED);
            }
            Err(e) => {
                report.fail(
                    format!("Credential file could not be opened: {e}"),
                    "Check that your user can read the GhostType data folder.",
                );
            }
        }

        self.check_permissions(&mut report);
        report
    }

    #[cfg(unix)]
    fn check_permissions(&self, report: &mut RepairReport) {
        use std::os::unix::fs::PermissionsExt;

        let targets = [Some(self.path.as_path()), self.path.parent()];
        for target in targets.into_iter().flatten() {
            if let Ok(meta) = fs::metadata(target) {
                let mode = meta.permissions().mode() & 0o777;
                if mode & 0o077 != 0 {
                    report.fail(
                        format!("{} is accessible to other users (mode {mode:o})", target.display()),
                        GUIDANCE_PERMISSIONS,
                    );
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn check_permissions(&self, _report: &mut RepairReport) {}
}

/// Remove group/other bits from `dir`. Owner bits are never added.
#[cfg(unix)]
fn restrict_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(dir)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        ghosttype_core::fs::set_mode(dir, mode & DIR_MODE)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

impl SecretStore for EncryptedFileStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::File
    }

    fn get(&self, key_ref: &str, _policy: ReadPolicy) -> Result<Option<String>> {
        validate_key_ref(key_ref)?;
        let _guard = self.op_lock.lock();
        let mut map = self.load()?;
        Ok(map.remove(key_ref))
    }

    fn set(&self, key_ref: &str, value: &str) -> Result<()> {
        validate_key_ref(key_ref)?;
        let _guard = self.op_lock.lock();
        let (mut map, _) = self.load_for_write()?;
        map.insert(key_ref.to_string(), value.to_string());
        self.save(&map)?;
        debug!(key_ref, "stored secret");
        Ok(())
    }

    fn delete(&self, key_ref: &str) -> Result<()> {
        validate_key_ref(key_ref)?;
        let _guard = self.op_lock.lock();
        let (mut map, corrupted) = self.load_for_write()?;
        if map.remove(key_ref).is_none() && !corrupted {
            return Ok(());
        }
        self.save(&map)?;
        debug!(key_ref, "deleted secret");
        Ok(())
    }

    fn delete_all(&self) -> RepairReport {
        let _guard = self.op_lock.lock();
        let mut report = self.report();

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "removed credential file");
                report.push_guidance("All saved credentials were removed. Re-enter your API keys.");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                report.push_guidance("No credential file was present.");
            }
            Err(e) => {
                warn!(path = %self.path.display(), "could not remove credential file: {e}");
                report.push_guidance(format!(
                    "The credential file could not be removed ({e}). Delete {} manually.",
                    self.path.display()
                ));
                report.found_current_items = self.load().map(|m| count_non_empty(&m)).unwrap_or(0);
            }
        }

        report
    }

    fn self_check(&self) -> RepairReport {
        let _guard = self.op_lock.lock();
        self.check_locked()
    }

    fn saved_secret_count(&self) -> usize {
        let _guard = self.op_lock.lock();
        self.load().map(|m| count_non_empty(&m)).unwrap_or(0)
    }
}
