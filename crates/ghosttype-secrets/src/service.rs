//! Credential facade used by the rest of the application.
//!
//! [`CredentialService`] maps [`CredentialKey`]s to key references, trims
//! values, keeps presence hints up to date, and delegates storage to
//! whichever [`SecretStore`] it was built with.

use std::sync::{Arc, OnceLock};

use ghosttype_core::{Config, Preferences};
use tracing::{debug, info, warn};

use crate::error::{Result, SecretError};
use crate::memory::DryRunStore;
use crate::presence::PresenceCache;
use crate::store::{EncryptedFileStore, SecretStore};
use crate::types::{
    CredentialKey, DecryptedSecret, PresenceHint, ReadPolicy, RepairReport, StoreBackend,
};

const GUIDANCE_AFTER_RESET: &str =
    "Credentials were reset. Open settings and re-enter your API keys.";

/// Presence flags for dry runs live here so every dry-run service in the
/// process agrees, without writing a preference file.
static DRY_RUN_PREFERENCES: OnceLock<Arc<Preferences>> = OnceLock::new();

/// Credential access for one store variant.
pub struct CredentialService {
    store: Arc<dyn SecretStore>,
    presence: PresenceCache,
}

impl CredentialService {
    pub fn new(store: Arc<dyn SecretStore>, presence: PresenceCache) -> Self {
        Self { store, presence }
    }

    /// The file-backed service described by `config`.
    pub fn live(config: &Config) -> Result<Self> {
        let store = EncryptedFileStore::for_machine(config.credentials_file()?);
        let prefs = Preferences::shared(config.preferences_file()?);
        info!(path = %store.path().display(), "using encrypted credential file");
        Ok(Self::new(
            Arc::new(store),
            PresenceCache::new(prefs, config.credentials.presence_prefix.clone()),
        ))
    }

    /// The in-memory service shared by every dry-run handle in the process.
    pub fn dry_run() -> Self {
        let prefs = DRY_RUN_PREFERENCES.get_or_init(|| Arc::new(Preferences::in_memory()));
        info!("using in-memory credential store (dry run)");
        Self::new(
            Arc::new(DryRunStore::shared()),
            PresenceCache::new(
                Arc::clone(prefs),
                ghosttype_core::config::CredentialsConfig::default().presence_prefix,
            ),
        )
    }

    /// A service with its own private store and hints, for tests.
    pub fn isolated() -> Self {
        Self::new(Arc::new(DryRunStore::isolated()), PresenceCache::in_memory())
    }

    pub fn backend(&self) -> StoreBackend {
        self.store.backend()
    }

    pub fn presence(&self) -> &PresenceCache {
        &self.presence
    }

    /// Read a credential. Missing, blank, corrupted, and unreadable all come
    /// back as `None`; the caller should ask the user to enter the key again.
    pub fn get_secret(&self, key: CredentialKey, policy: ReadPolicy) -> Option<DecryptedSecret> {
        match self.store.get(&key.key_ref(), policy) {
            Ok(raw) => {
                let secret = raw.as_deref().and_then(DecryptedSecret::normalize);
                self.presence
                    .record(key, PresenceHint::from_present(secret.is_some()));
                secret
            }
            Err(SecretError::CorruptedFile(reason)) => {
                warn!(credential = %key, "credential file unreadable, treating as empty: {reason}");
                self.presence.record(key, PresenceHint::Missing);
                None
            }
            Err(e) => {
                warn!(credential = %key, "could not read credential: {e}");
                None
            }
        }
    }

    /// Save a credential. A blank value removes it instead.
    ///
    /// Errors mean the value was not saved and must be shown to the user.
    pub fn set_secret(&self, value: &str, key: CredentialKey) -> Result<()> {
        let key_ref = key.key_ref();
        match DecryptedSecret::normalize(value) {
            Some(secret) => {
                self.store.set(&key_ref, secret.expose())?;
                self.presence.record(key, PresenceHint::Present);
                debug!(credential = %key, "saved credential");
            }
            None => {
                self.store.delete(&key_ref)?;
                self.presence.record(key, PresenceHint::Missing);
                debug!(credential = %key, "blank value, removed credential");
            }
        }
        Ok(())
    }

    pub fn delete_secret(&self, key: CredentialKey) -> Result<()> {
        self.store.delete(&key.key_ref())?;
        self.presence.record(key, PresenceHint::Missing);
        debug!(credential = %key, "deleted credential");
        Ok(())
    }

    /// Remove every credential. Never fails; see the report for problems.
    pub fn delete_all_secrets(&self) -> RepairReport {
        let report = self.store.delete_all();
        self.presence.mark_all_missing();
        info!(backend = %self.backend(), "deleted all credentials");
        report
    }

    /// Cached hint; never touches the store.
    pub fn presence_hint(&self, key: CredentialKey) -> PresenceHint {
        self.presence.get(key)
    }

    /// Re-read every known credential and overwrite its hint.
    pub fn reconcile_presence_hints(&self) -> Vec<(CredentialKey, PresenceHint)> {
        for key in CredentialKey::ALL {
            let hint = match self.store.get(&key.key_ref(), ReadPolicy::NoUserInteraction) {
                Ok(raw) => PresenceHint::from_present(
                    raw.as_deref().and_then(DecryptedSecret::normalize).is_some(),
                ),
                Err(SecretError::CorruptedFile(_)) => PresenceHint::Missing,
                Err(e) => {
                    warn!(credential = %key, "could not reconcile presence hint: {e}");
                    PresenceHint::Unknown
                }
            };
            self.presence.record(key, hint);
        }
        debug!("reconciled presence hints");
        self.presence.snapshot()
    }

    pub fn self_check(&self) -> RepairReport {
        self.store.self_check()
    }

    pub fn saved_secret_count(&self) -> usize {
        self.store.saved_secret_count()
    }

    /// Check the store and, if it is unhealthy, offer a reset.
    ///
    /// `confirm` is only consulted when `policy` allows interaction and the
    /// check found failures. Declining returns the check report unchanged.
    pub fn run_interactive_repair<F>(&self, policy: ReadPolicy, confirm: F) -> RepairReport
    where
        F: FnOnce(&RepairReport) -> bool,
    {
        let check = self.self_check();
        if check.is_healthy() {
            debug!("credential store healthy, nothing to repair");
            return check;
        }
        if !policy.allows_interaction() {
            return check;
        }
        if !confirm(&check) {
            info!("credential repair declined");
            return check;
        }

        let mut report = self.delete_all_secrets();
        self.reconcile_presence_hints();

        // The reset only reports problems as guidance; the follow-up check
        // decides whether the store actually recovered.
        let after = self.self_check();
        report.found_current_items = after.found_current_items;
        report.failures.extend(after.failures);
        for guidance in after.guidance {
            report.push_guidance(guidance);
        }
        if report.is_healthy() {
            report.push_guidance(GUIDANCE_AFTER_RESET);
        } else {
            warn!("credential store still unhealthy after reset");
        }
        report
    }

    /// Read a free-form key reference. No trimming, no presence hints.
    pub fn get_secret_ref(&self, key_ref: &str, policy: ReadPolicy) -> Result<Option<String>> {
        self.store.get(key_ref, policy)
    }

    pub fn set_secret_ref(&self, key_ref: &str, value: &str) -> Result<()> {
        self.store.set(key_ref, value)
    }

    pub fn delete_secret_ref(&self, key_ref: &str) -> Result<()> {
        self.store.delete(key_ref)
    }
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("backend", &self.backend())
            .field("presence", &self.presence)
            .finish()
    }
}
