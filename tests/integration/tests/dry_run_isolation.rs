//! Dry-run services never touch disk and share state within the process.

use ghosttype_core::Config;
use ghosttype_secrets::{
    CredentialKey, CredentialRegistry, CredentialService, ReadPolicy, StoreBackend, StoreMode,
};
use tempfile::TempDir;

const READ: ReadPolicy = ReadPolicy::NoUserInteraction;

#[test]
fn test_dry_run_handles_share_state() {
    let first = CredentialService::dry_run();
    let second = CredentialService::dry_run();
    assert_eq!(first.backend(), StoreBackend::DryRun);

    // Unique ref so parallel tests in this binary do not collide.
    first
        .set_secret_ref("ghosttype.test.shared-handles", "shared")
        .unwrap();
    assert_eq!(
        second
            .get_secret_ref("ghosttype.test.shared-handles", READ)
            .unwrap()
            .as_deref(),
        Some("shared")
    );
}

#[test]
fn test_isolated_services_do_not_share() {
    let a = CredentialService::isolated();
    let b = CredentialService::isolated();

    a.set_secret("sk-a", CredentialKey::OpenAi).unwrap();
    assert!(b.get_secret(CredentialKey::OpenAi, READ).is_none());
    assert_eq!(b.saved_secret_count(), 0);
}

#[test]
fn test_dry_run_report_has_no_path() {
    let service = CredentialService::isolated();
    let report = service.self_check();
    assert!(report.is_healthy());
    assert_eq!(report.backend, StoreBackend::DryRun);
    assert!(report.store_path.is_none());
    assert!(!report.guidance.is_empty());
}

#[test]
fn test_repeated_cycles_never_touch_live_paths() {
    let dir = TempDir::new().unwrap();
    let store_file = dir.path().join("credentials").join("secrets.bin");
    let prefs_file = dir.path().join("preferences.json");
    let mut config = Config::default();
    config.credentials.store_file = Some(store_file.clone());
    config.credentials.preferences_file = Some(prefs_file.clone());

    let registry = CredentialRegistry::with_mode(StoreMode::DryRun, &config).unwrap();
    let service = registry.current();
    for round in 0..5 {
        for key in CredentialKey::ALL {
            service.set_secret(&format!("value-{round}"), key).unwrap();
        }
        service.reconcile_presence_hints();
        for key in CredentialKey::ALL {
            service.delete_secret(key).unwrap();
        }
        service.set_secret("kept", CredentialKey::Deepgram).unwrap();
        service.delete_all_secrets();
        service.self_check();
    }

    assert!(!store_file.exists());
    assert!(!prefs_file.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
