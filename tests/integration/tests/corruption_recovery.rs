//! Behaviour when the credential file cannot be decrypted.

use ghosttype_integration_tests::FileFixture;
use ghosttype_secrets::{CredentialKey, EncryptionKey, PresenceHint, ReadPolicy};
use tempfile::TempDir;

const READ: ReadPolicy = ReadPolicy::NoUserInteraction;

fn corrupt(fixture: &FileFixture) {
    let dir = fixture.store_path.parent().unwrap();
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(&fixture.store_path, vec![0u8; 64]).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).unwrap();
        std::fs::set_permissions(&fixture.store_path, std::fs::Permissions::from_mode(0o600))
            .unwrap();
    }
}

#[test]
fn test_corrupted_file_reads_as_missing() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    corrupt(&fixture);

    let service = fixture.service();
    assert!(service.get_secret(CredentialKey::OpenAi, READ).is_none());
    assert_eq!(service.presence_hint(CredentialKey::OpenAi), PresenceHint::Missing);
    assert_eq!(service.saved_secret_count(), 0);
    assert!(!service.self_check().is_healthy());
}

#[test]
fn test_key_change_looks_like_corruption() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    fixture.service().set_secret("sk-1", CredentialKey::Anthropic).unwrap();

    let other = fixture.service_with_key(EncryptionKey::random());
    assert!(other.get_secret(CredentialKey::Anthropic, READ).is_none());

    let report = other.self_check();
    assert!(!report.is_healthy());
    assert!(!report.guidance.is_empty());
}

#[test]
fn test_write_replaces_corrupted_file() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    corrupt(&fixture);

    let service = fixture.service();
    service.set_secret("gsk-new", CredentialKey::Groq).unwrap();

    assert_eq!(service.get_secret(CredentialKey::Groq, READ).unwrap().expose(), "gsk-new");
    assert!(service.self_check().is_healthy());
}

#[test]
fn test_repair_declined_leaves_file() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    corrupt(&fixture);

    let service = fixture.service();
    let report = service.run_interactive_repair(ReadPolicy::AllowUserInteraction, |_| false);
    assert!(!report.is_healthy());
    assert!(fixture.store_path.exists());
}

#[test]
fn test_repair_without_interaction_never_prompts() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    corrupt(&fixture);

    let service = fixture.service();
    let report = service.run_interactive_repair(ReadPolicy::NoUserInteraction, |_| {
        panic!("confirm must not be called without interaction")
    });
    assert!(!report.is_healthy());
    assert!(fixture.store_path.exists());
}

#[test]
fn test_repair_confirmed_resets_store() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    corrupt(&fixture);

    let service = fixture.service();
    let report = service.run_interactive_repair(ReadPolicy::AllowUserInteraction, |check| {
        assert!(!check.failures.is_empty());
        true
    });
    assert!(report.is_healthy(), "{:?}", report.failures);
    assert!(!fixture.store_path.exists());
    assert_eq!(service.presence_hint(CredentialKey::OpenAi), PresenceHint::Missing);
}

#[test]
fn test_repair_that_cannot_remove_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    std::fs::create_dir_all(fixture.store_path.join("in-the-way")).unwrap();

    let service = fixture.service();
    let report = service.run_interactive_repair(ReadPolicy::AllowUserInteraction, |_| true);
    assert!(!report.is_healthy());
    assert!(!report.guidance.iter().any(|g| g.starts_with("Credentials were reset")));
    assert!(fixture.store_path.exists());
}
