//! Cached presence hints.
//!
//! A hint answers "is anything configured for this provider?" without
//! decrypting the store. Hints live in the preference store as
//! `<prefix>.<credential name>` booleans; an absent flag reads as
//! [`PresenceHint::Unknown`].
//!
//! Hints may be stale, for example after the credential file was edited or
//! removed by another process. They are never made transactionally
//! consistent with the store; [`crate::CredentialService::reconcile_presence_hints`]
//! rewrites all of them from the store when freshness matters.

use std::sync::Arc;

use ghosttype_core::Preferences;

use crate::types::{CredentialKey, PresenceHint};

/// Presence hints backed by a shared preference store.
#[derive(Clone)]
pub struct PresenceCache {
    prefs: Arc<Preferences>,
    prefix: String,
}

impl PresenceCache {
    pub fn new(prefs: Arc<Preferences>, prefix: impl Into<String>) -> Self {
        Self {
            prefs,
            prefix: prefix.into(),
        }
    }

    /// A cache that keeps its flags in memory only.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(Preferences::in_memory()),
            ghosttype_core::config::CredentialsConfig::default().presence_prefix,
        )
    }

    fn pref_key(&self, key: CredentialKey) -> String {
        format!("{}.{}", self.prefix, key.name())
    }

    pub fn get(&self, key: CredentialKey) -> PresenceHint {
        match self.prefs.get_bool(&self.pref_key(key)) {
            Some(present) => PresenceHint::from_present(present),
            None => PresenceHint::Unknown,
        }
    }

    pub fn record(&self, key: CredentialKey, hint: PresenceHint) {
        let pref_key = self.pref_key(key);
        match hint {
            PresenceHint::Present => self.prefs.set_bool(&pref_key, true),
            PresenceHint::Missing => self.prefs.set_bool(&pref_key, false),
            PresenceHint::Unknown => self.prefs.remove(&pref_key),
        }
    }

    /// Mark every known credential missing. Flags under the prefix for
    /// providers this build does not know are dropped.
    pub fn mark_all_missing(&self) {
        let known: Vec<String> = CredentialKey::ALL.iter().map(|k| self.pref_key(*k)).collect();
        for stale in self.prefs.keys_with_prefix(&format!("{}.", self.prefix)) {
            if !known.contains(&stale) {
                self.prefs.remove(&stale);
            }
        }
        for key in CredentialKey::ALL {
            self.record(key, PresenceHint::Missing);
        }
    }

    /// Every known credential with its current hint.
    pub fn snapshot(&self) -> Vec<(CredentialKey, PresenceHint)> {
        CredentialKey::ALL.into_iter().map(|k| (k, self.get(k))).collect()
    }
}

impl std::fmt::Debug for PresenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceCache")
            .field("prefix", &self.prefix)
            .finish()
    }
}
