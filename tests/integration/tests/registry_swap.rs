//! Registry selection and runtime swapping.

use std::sync::Arc;

use ghosttype_core::Config;
use ghosttype_integration_tests::FileFixture;
use ghosttype_secrets::{
    CredentialKey, CredentialRegistry, CredentialService, ReadPolicy, StoreBackend, StoreMode,
};
use tempfile::TempDir;

#[test]
fn test_scoped_file_service_restored() {
    let registry = CredentialRegistry::with_mode(StoreMode::DryRun, &Config::default()).unwrap();
    assert_eq!(registry.mode(), StoreMode::DryRun);

    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    {
        let _guard = registry.install_scoped(fixture.service());
        assert_eq!(registry.mode(), StoreMode::Live);
        registry
            .current()
            .set_secret("sk-scoped", CredentialKey::OpenAi)
            .unwrap();
    }

    assert_eq!(registry.current().backend(), StoreBackend::DryRun);
    assert!(fixture.store_path.exists());
}

#[test]
fn test_replace_keeps_old_handle_usable() {
    let registry = CredentialRegistry::new(CredentialService::isolated());
    let old = registry.current();
    old.set_secret("a", CredentialKey::Gemini).unwrap();

    let returned = registry.replace(CredentialService::isolated());
    assert!(Arc::ptr_eq(&old, &returned));
    assert!(old
        .get_secret(CredentialKey::Gemini, ReadPolicy::NoUserInteraction)
        .is_some());
    assert!(registry
        .current()
        .get_secret(CredentialKey::Gemini, ReadPolicy::NoUserInteraction)
        .is_none());
}

fn none(_: &str) -> Option<String> {
    None
}

#[test]
fn test_detect_precedence() {
    assert_eq!(StoreMode::detect(["ghosttype"], none, false), StoreMode::Live);
    assert_eq!(
        StoreMode::detect(["ghosttype", "--dry-run-credentials"], none, false),
        StoreMode::DryRun
    );
    // Flags after `--` belong to someone else.
    assert_eq!(
        StoreMode::detect(["ghosttype", "--", "--dry-run-credentials"], none, false),
        StoreMode::Live
    );
}

#[test]
fn test_live_mode_uses_configured_file() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.credentials.store_file = Some(dir.path().join("store").join("keys.bin"));
    config.credentials.preferences_file = Some(dir.path().join("preferences.json"));

    let registry = CredentialRegistry::with_mode(StoreMode::Live, &config).unwrap();
    let report = registry.current().self_check();
    assert_eq!(report.backend, StoreBackend::File);
    assert_eq!(
        report.store_path.as_deref(),
        Some(dir.path().join("store").join("keys.bin").as_path())
    );

    registry
        .current()
        .set_secret("sk-live", CredentialKey::Anthropic)
        .unwrap();
    assert!(dir.path().join("preferences.json").exists());
}
