// tests/vault/resolver.rs
use std::fs;
use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use vaulted_core::backend::upgrade_legacy_key_file;
use vaulted_core::{
    resolve, CredentialStore, KeyFileFormat, KeyResolver, KeySource, MasterKey,
    MemoryCredentialStore, VaultError,
};

use crate::common::{FailingCredentialStore, TestDir};

#[test]
fn test_empty_path_generates_then_second_resolver_loads_same_key() {
    let dir = TestDir::new();

    let first = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(first.source, KeySource::Generated);
    assert!(dir.key_path.exists());

    let second = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(second.source, KeySource::File(KeyFileFormat::Base64));
    assert_eq!(first.key.expose_secret(), second.key.expose_secret());
}

#[test]
fn test_generated_key_file_is_base64_text() {
    let dir = TestDir::new();
    let resolved = KeyResolver::new(&dir.key_path).resolve().unwrap();

    let content = fs::read_to_string(&dir.key_path).unwrap();
    assert_eq!(content.len(), 44);
    assert_eq!(STANDARD.decode(&content).unwrap(), resolved.key.expose_secret());
}

#[cfg(unix)]
#[test]
fn test_generated_key_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TestDir::new();
    KeyResolver::new(&dir.key_path).resolve().unwrap();

    let mode = fs::metadata(&dir.key_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_missing_parent_directories_are_created() {
    let dir = TestDir::new();
    let nested = dir.path("a/b/c/vault.key");

    let resolved = KeyResolver::new(&nested).resolve().unwrap();
    assert_eq!(resolved.source, KeySource::Generated);
    assert!(nested.exists());
}

#[test]
fn test_legacy_raw_key_file_is_loaded() {
    let dir = TestDir::new();
    let raw = [0x5au8; 32];
    fs::write(&dir.key_path, raw).unwrap();

    let resolved = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(resolved.source, KeySource::File(KeyFileFormat::Raw));
    assert_eq!(resolved.key.expose_secret(), &raw);
    // Untouched without the upgrade flag
    assert_eq!(fs::read(&dir.key_path).unwrap(), raw);
}

#[test]
fn test_legacy_raw_key_file_upgrade_keeps_key() {
    let dir = TestDir::new();
    let raw = [0x5au8; 32];
    fs::write(&dir.key_path, raw).unwrap();

    let resolved = KeyResolver::new(&dir.key_path)
        .with_legacy_upgrade(true)
        .resolve()
        .unwrap();
    assert_eq!(resolved.key.expose_secret(), &raw);

    let content = fs::read_to_string(&dir.key_path).unwrap();
    assert_eq!(STANDARD.decode(content.trim()).unwrap(), raw);

    let reloaded = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(reloaded.source, KeySource::File(KeyFileFormat::Base64));
    assert_eq!(reloaded.key.expose_secret(), &raw);
}

#[test]
fn test_upgrade_legacy_key_file_function() {
    let dir = TestDir::new();
    fs::write(&dir.key_path, [0x11u8; 32]).unwrap();

    assert!(upgrade_legacy_key_file(&dir.key_path).unwrap());
    // Already current: nothing to do
    assert!(!upgrade_legacy_key_file(&dir.key_path).unwrap());
    // Missing file: nothing to do
    assert!(!upgrade_legacy_key_file(&dir.path("absent.key")).unwrap());
}

#[test]
fn test_url_safe_and_newline_terminated_files_are_accepted() {
    let dir = TestDir::new();
    let bytes = [0xfbu8; 32];
    fs::write(&dir.key_path, format!("{}\n", URL_SAFE.encode(bytes))).unwrap();

    let resolved = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(resolved.source, KeySource::File(KeyFileFormat::Base64));
    assert_eq!(resolved.key.expose_secret(), &bytes);
}

#[test]
fn test_invalid_key_file_is_replaced_by_generated_key() {
    let dir = TestDir::new();
    fs::write(&dir.key_path, b"too short").unwrap();

    let resolved = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(resolved.source, KeySource::Generated);

    let reloaded = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(reloaded.key.expose_secret(), resolved.key.expose_secret());
}

#[test]
fn test_base64_of_wrong_length_is_invalid_not_truncated() {
    let dir = TestDir::new();
    fs::write(&dir.key_path, STANDARD.encode([9u8; 16])).unwrap();

    let resolved = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(resolved.source, KeySource::Generated);
    assert_eq!(resolved.key.expose_secret().len(), 32);
}

#[test]
fn test_unreadable_key_path_is_fatal() {
    let dir = TestDir::new();
    fs::create_dir(&dir.key_path).unwrap();

    let result = KeyResolver::new(&dir.key_path).resolve();
    assert!(matches!(result, Err(VaultError::KeyResolution(_))));
    assert!(dir.key_path.is_dir());
}

#[test]
fn test_credential_store_takes_priority_over_file() {
    let dir = TestDir::new();
    let in_store = MasterKey::from_bytes([1u8; 32]);
    fs::write(&dir.key_path, STANDARD.encode([2u8; 32])).unwrap();

    let store = Arc::new(MemoryCredentialStore::with_secret(&in_store.to_base64()));
    let resolved = KeyResolver::new(&dir.key_path)
        .with_credential_store(store)
        .resolve()
        .unwrap();

    assert_eq!(resolved.source, KeySource::CredentialStore);
    assert_eq!(resolved.key.expose_secret(), &[1u8; 32]);
}

#[test]
fn test_invalid_credential_entry_falls_through_to_file() {
    let dir = TestDir::new();
    fs::write(&dir.key_path, STANDARD.encode([2u8; 32])).unwrap();

    let store = Arc::new(MemoryCredentialStore::with_secret(&STANDARD.encode([1u8; 16])));
    let resolved = KeyResolver::new(&dir.key_path)
        .with_credential_store(store)
        .resolve()
        .unwrap();

    assert_eq!(resolved.source, KeySource::File(KeyFileFormat::Base64));
    assert_eq!(resolved.key.expose_secret(), &[2u8; 32]);
}

#[test]
fn test_generated_key_is_saved_to_credential_store() {
    let dir = TestDir::new();
    let store = Arc::new(MemoryCredentialStore::new());

    let resolved = KeyResolver::new(&dir.key_path)
        .with_credential_store(store.clone())
        .resolve()
        .unwrap();

    let saved = store.get().unwrap().expect("credential entry written");
    assert_eq!(saved.as_str(), resolved.key.to_base64().as_str());

    // File alone reproduces the same key
    let from_file = KeyResolver::new(&dir.key_path).resolve().unwrap();
    assert_eq!(from_file.key.expose_secret(), resolved.key.expose_secret());
}

#[test]
fn test_failing_credential_store_degrades_to_file() {
    let dir = TestDir::new();

    let generated = KeyResolver::new(&dir.key_path)
        .with_credential_store(Arc::new(FailingCredentialStore))
        .resolve()
        .unwrap();
    assert_eq!(generated.source, KeySource::Generated);

    let loaded = KeyResolver::new(&dir.key_path)
        .with_credential_store(Arc::new(FailingCredentialStore))
        .resolve()
        .unwrap();
    assert_eq!(loaded.source, KeySource::File(KeyFileFormat::Base64));
    assert_eq!(loaded.key.expose_secret(), generated.key.expose_secret());
}

#[test]
fn test_key_path_below_a_regular_file_is_fatal() {
    let dir = TestDir::new();
    // A file where the key's parent directory should be
    fs::write(dir.path("blocker"), b"").unwrap();

    let result = KeyResolver::new(dir.path("blocker/vault.key")).resolve();
    assert!(matches!(result, Err(VaultError::KeyResolution(_))));
}

#[test]
fn test_resolve_function_without_credential_store() {
    let dir = TestDir::new();
    let first = resolve(&dir.key_path, false).unwrap();
    let second = resolve(&dir.key_path, false).unwrap();
    assert_eq!(first.expose_secret(), second.expose_secret());
}
