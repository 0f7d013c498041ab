//! Selection and ownership of the active [`CredentialService`].
//!
//! The process entry point builds one [`CredentialRegistry`] and hands it
//! (or the service it returns) to whatever needs credentials. Code that
//! cannot be given a registry goes through [`global`], which is the same
//! thing behind a lazily initialised static.
//!
//! The active service sits behind a short-held mutex. Swapping it only
//! moves an `Arc`, so it never waits on store I/O, and readers always get a
//! fully built service.

use std::sync::{Arc, OnceLock};

use ghosttype_core::env::{self, flags, vars};
use ghosttype_core::Config;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::service::CredentialService;
use crate::types::StoreBackend;

/// Which store the registry starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Live,
    DryRun,
}

impl StoreMode {
    /// Decide the mode from launch arguments, an environment lookup, and the
    /// config file's `credentials.dry_run`. Any one of them selects dry run.
    pub fn detect<I, S, E>(args: I, env_lookup: E, config_dry_run: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        E: Fn(&str) -> Option<String>,
    {
        let from_env = env_lookup(vars::GHOSTTYPE_CREDENTIALS_DRY_RUN)
            .as_deref()
            .is_some_and(env::is_truthy);
        let from_args = env::has_launch_flag(args, flags::DRY_RUN_CREDENTIALS);

        if from_env || from_args || config_dry_run {
            StoreMode::DryRun
        } else {
            StoreMode::Live
        }
    }

    /// Decide the mode for the running process.
    pub fn from_process(config: &Config) -> Self {
        Self::detect(std::env::args(), env::get_var, config.credentials.dry_run)
    }
}

/// Holder of the active credential service.
pub struct CredentialRegistry {
    active: Mutex<Arc<CredentialService>>,
}

impl CredentialRegistry {
    pub fn new(service: CredentialService) -> Self {
        Self {
            active: Mutex::new(Arc::new(service)),
        }
    }

    /// Build the service `mode` asks for.
    pub fn with_mode(mode: StoreMode, config: &Config) -> Result<Self> {
        let service = match mode {
            StoreMode::Live => CredentialService::live(config)?,
            StoreMode::DryRun => CredentialService::dry_run(),
        };
        Ok(Self::new(service))
    }

    /// Build from config plus the process's environment and arguments.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_mode(StoreMode::from_process(config), config)
    }

    /// The active service.
    pub fn current(&self) -> Arc<CredentialService> {
        self.active.lock().clone()
    }

    /// Install `service` and return the one it replaced.
    pub fn replace(&self, service: CredentialService) -> Arc<CredentialService> {
        self.replace_arc(Arc::new(service))
    }

    fn replace_arc(&self, service: Arc<CredentialService>) -> Arc<CredentialService> {
        let backend = service.backend();
        let previous = std::mem::replace(&mut *self.active.lock(), service);
        info!(%backend, "credential service replaced");
        previous
    }

    /// Install `service` until the returned guard is dropped.
    pub fn install_scoped(&self, service: CredentialService) -> RegistryOverride<'_> {
        let previous = self.replace(service);
        RegistryOverride {
            registry: self,
            previous: Some(previous),
        }
    }

    pub fn mode(&self) -> StoreMode {
        match self.current().backend() {
            StoreBackend::File => StoreMode::Live,
            StoreBackend::DryRun => StoreMode::DryRun,
        }
    }
}

impl std::fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRegistry")
            .field("active", &*self.active.lock())
            .finish()
    }
}

/// Restores the previously active service when dropped.
#[must_use = "the override ends as soon as the guard is dropped"]
pub struct RegistryOverride<'a> {
    registry: &'a CredentialRegistry,
    previous: Option<Arc<CredentialService>>,
}

impl Drop for RegistryOverride<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.registry.replace_arc(previous);
        }
    }
}

static GLOBAL: OnceLock<CredentialRegistry> = OnceLock::new();

/// Process-wide registry for call sites that cannot be handed one.
///
/// Initialised on first use from the default config file and the process
/// environment. If the live store cannot be located the registry starts in
/// dry-run mode so nothing is written to an unexpected place.
pub fn global() -> &'static CredentialRegistry {
    GLOBAL.get_or_init(|| {
        let config = Config::load_or_default(None);
        CredentialRegistry::from_config(&config).unwrap_or_else(|e| {
            warn!("could not open credential store, falling back to dry run: {e}");
            CredentialRegistry::new(CredentialService::dry_run())
        })
    })
}

/// Install a registry built by the process entry point as the global one.
///
/// Returns the registry back if the global was already initialised.
pub fn install_global(
    registry: CredentialRegistry,
) -> std::result::Result<&'static CredentialRegistry, CredentialRegistry> {
    GLOBAL.set(registry)?;
    Ok(global())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CredentialKey, ReadPolicy};
    use std::collections::HashMap;
    use std::thread;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_detect_defaults_to_live() {
        let mode = StoreMode::detect(["ghosttype"], lookup(&[]), false);
        assert_eq!(mode, StoreMode::Live);
    }

    #[test]
    fn test_detect_env_var() {
        let env = lookup(&[(vars::GHOSTTYPE_CREDENTIALS_DRY_RUN, "1")]);
        assert_eq!(StoreMode::detect(["ghosttype"], env, false), StoreMode::DryRun);

        let env = lookup(&[(vars::GHOSTTYPE_CREDENTIALS_DRY_RUN, "false")]);
        assert_eq!(StoreMode::detect(["ghosttype"], env, false), StoreMode::Live);
    }

    #[test]
    fn test_detect_launch_flag() {
        let args = ["ghosttype", "--dry-run-credentials"];
        assert_eq!(StoreMode::detect(args, lookup(&[]), false), StoreMode::DryRun);
    }

    #[test]
    fn test_detect_config_flag() {
        assert_eq!(StoreMode::detect(["ghosttype"], lookup(&[]), true), StoreMode::DryRun);
    }

    #[test]
    fn test_replace_returns_previous() {
        let registry = CredentialRegistry::new(CredentialService::isolated());
        let first = registry.current();
        first.set_secret("one", CredentialKey::OpenAi).unwrap();

        let previous = registry.replace(CredentialService::isolated());
        assert!(Arc::ptr_eq(&previous, &first));
        assert!(registry
            .current()
            .get_secret(CredentialKey::OpenAi, ReadPolicy::NoUserInteraction)
            .is_none());
    }

    #[test]
    fn test_scoped_override_restores() {
        let registry = CredentialRegistry::new(CredentialService::isolated());
        let original = registry.current();

        {
            let _guard = registry.install_scoped(CredentialService::isolated());
            assert!(!Arc::ptr_eq(&registry.current(), &original));
        }

        assert!(Arc::ptr_eq(&registry.current(), &original));
    }

    #[test]
    fn test_held_service_survives_replacement() {
        let registry = CredentialRegistry::new(CredentialService::isolated());
        let held = registry.current();
        held.set_secret("kept", CredentialKey::Groq).unwrap();

        registry.replace(CredentialService::isolated());
        assert_eq!(
            held.get_secret(CredentialKey::Groq, ReadPolicy::NoUserInteraction)
                .unwrap()
                .expose(),
            "kept"
        );
    }

    #[test]
    fn test_concurrent_readers_and_swaps() {
        let registry = Arc::new(CredentialRegistry::new(CredentialService::isolated()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..25 {
                        if i % 2 == 0 {
                            registry.replace(CredentialService::isolated());
                        } else {
                            assert_eq!(registry.current().backend(), StoreBackend::DryRun);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.mode(), StoreMode::DryRun);
    }

    // The only test in this binary that touches the process-wide registry.
    #[test]
    fn test_install_global_once() {
        let registry = CredentialRegistry::new(CredentialService::isolated());
        let installed = install_global(registry).unwrap();
        assert!(std::ptr::eq(installed, global()));

        let second = CredentialRegistry::new(CredentialService::isolated());
        assert!(install_global(second).is_err());
    }

    #[test]
    fn test_with_mode_dry_run() {
        let registry = CredentialRegistry::with_mode(StoreMode::DryRun, &Config::default()).unwrap();
        assert_eq!(registry.mode(), StoreMode::DryRun);
    }
}
