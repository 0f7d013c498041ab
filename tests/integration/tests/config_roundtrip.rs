//! Config save/load roundtrip integration tests.

use ghosttype_core::config::{Config, LogLevel};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.credentials.dry_run, config.credentials.dry_run);
    assert_eq!(loaded.credentials.presence_prefix, config.credentials.presence_prefix);
    assert_eq!(loaded.logging.level, config.logging.level);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let mut config = Config::default();
    config.credentials.dry_run = true;
    config.credentials.store_file = Some(PathBuf::from("/tmp/ghosttype-test/secrets.bin"));
    config.logging.level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert!(loaded.credentials.dry_run);
    assert_eq!(
        loaded.credentials.store_file,
        Some(PathBuf::from("/tmp/ghosttype-test/secrets.bin"))
    );
    assert_eq!(loaded.logging.level, LogLevel::Debug);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/config.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_config_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(Some(&dir.path().join("absent.json5")));
    assert!(!config.credentials.dry_run);
    assert!(config.validate().is_ok());
}
