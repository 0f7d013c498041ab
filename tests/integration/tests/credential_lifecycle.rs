//! End-to-end credential lifecycle against the encrypted file store.

use ghosttype_integration_tests::FileFixture;
use ghosttype_secrets::{CredentialKey, PresenceHint, ReadPolicy};
use tempfile::TempDir;

const READ: ReadPolicy = ReadPolicy::NoUserInteraction;

#[test]
fn test_values_survive_restart() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());

    let service = fixture.service();
    service.set_secret("sk-openai-abc", CredentialKey::OpenAi).unwrap();
    service.set_secret("dg-123", CredentialKey::Deepgram).unwrap();
    drop(service);

    let restarted = fixture.service();
    assert_eq!(
        restarted.get_secret(CredentialKey::OpenAi, READ).unwrap().expose(),
        "sk-openai-abc"
    );
    assert_eq!(
        restarted.get_secret(CredentialKey::Deepgram, READ).unwrap().expose(),
        "dg-123"
    );
    assert_eq!(restarted.saved_secret_count(), 2);
}

#[test]
fn test_presence_hints_persist_across_restart() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());

    let service = fixture.service();
    assert_eq!(service.presence_hint(CredentialKey::Gemini), PresenceHint::Unknown);
    service.set_secret("gm-1", CredentialKey::Gemini).unwrap();
    service.delete_secret(CredentialKey::Groq).unwrap();
    drop(service);

    let restarted = fixture.service();
    assert_eq!(restarted.presence_hint(CredentialKey::Gemini), PresenceHint::Present);
    assert_eq!(restarted.presence_hint(CredentialKey::Groq), PresenceHint::Missing);
    assert_eq!(restarted.presence_hint(CredentialKey::Anthropic), PresenceHint::Unknown);
}

#[test]
fn test_file_never_contains_plaintext() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());

    fixture
        .service()
        .set_secret("sk-very-recognisable-value", CredentialKey::Anthropic)
        .unwrap();

    let bytes = std::fs::read(&fixture.store_path).unwrap();
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(!haystack.contains("sk-very-recognisable-value"));
    assert!(!haystack.contains("ghosttype.api"));
}

#[test]
fn test_blank_value_clears_credential() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    let service = fixture.service();

    service.set_secret("el-key", CredentialKey::ElevenLabs).unwrap();
    service.set_secret("   ", CredentialKey::ElevenLabs).unwrap();

    assert!(service.get_secret(CredentialKey::ElevenLabs, READ).is_none());
    assert_eq!(service.presence_hint(CredentialKey::ElevenLabs), PresenceHint::Missing);
    assert_eq!(service.saved_secret_count(), 0);
}

#[test]
fn test_delete_all_then_reconcile() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    let service = fixture.service();

    for key in CredentialKey::ALL {
        service.set_secret(&format!("value-{}", key.name()), key).unwrap();
    }
    assert_eq!(service.saved_secret_count(), CredentialKey::ALL.len());

    let report = service.delete_all_secrets();
    assert!(report.is_healthy(), "{:?}", report.failures);
    assert!(!fixture.store_path.exists());

    for (_, hint) in service.reconcile_presence_hints() {
        assert_eq!(hint, PresenceHint::Missing);
    }
}

#[test]
fn test_free_form_key_refs_share_the_file() {
    let dir = TempDir::new().unwrap();
    let fixture = FileFixture::new(dir.path());
    let service = fixture.service();

    service.set_secret_ref("ghosttype.custom.webhook", "hook-1").unwrap();
    service.set_secret("sk-1", CredentialKey::OpenAi).unwrap();

    let restarted = fixture.service();
    assert_eq!(
        restarted
            .get_secret_ref("ghosttype.custom.webhook", READ)
            .unwrap()
            .as_deref(),
        Some("hook-1")
    );
    assert!(restarted.set_secret_ref("bad key/ref", "x").is_err());

    restarted.delete_secret_ref("ghosttype.custom.webhook").unwrap();
    assert_eq!(restarted.saved_secret_count(), 1);
}
