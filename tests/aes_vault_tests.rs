//! Integration tests for the shared-key (AES-256-GCM) vault.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use coffer::config::{Config, ProviderType};
use coffer::crypto::{encrypt_value, generate_key, EncryptionKey};
use coffer::vault::{self, persist, Aes256Vault, Provider, SecretValue, VaultState};
use coffer::VaultError;
use tempfile::TempDir;

/// Helper: a temp dir with a key file and an AES config pointing at both.
fn setup() -> (TempDir, Config, EncryptionKey) {
    let dir = TempDir::new().unwrap();
    let key = generate_key();
    let key_path = write_key(dir.path(), "vault.key", &key);
    let config = Config::new("test", ProviderType::Aes256)
        .with_storage_path(dir.path().join("store").to_string_lossy())
        .with_key_from_file(key_path.to_string_lossy());
    (dir, config, key)
}

fn write_key(dir: &Path, name: &str, key: &EncryptionKey) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{}\n", key.as_str())).unwrap();
    path
}

// ---------------------------------------------------------------------------
// CRUD lifecycle
// ---------------------------------------------------------------------------

#[test]
fn set_get_delete_lifecycle() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();

    vault.set_secret("k", SecretValue::from("v")).unwrap();
    assert_eq!(vault.get_secret("k").unwrap().plaintext(), "v");
    assert!(vault.has_secret("k").unwrap());

    vault.delete_secret("k").unwrap();
    assert!(matches!(
        vault.get_secret("k"),
        Err(VaultError::SecretNotFound(name)) if name == "k"
    ));
    assert!(matches!(
        vault.delete_secret("k"),
        Err(VaultError::SecretNotFound(_))
    ));
    assert!(!vault.has_secret("k").unwrap());
}

#[test]
fn set_overwrites_existing_value() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();

    vault.set_secret("api.token", SecretValue::from("one")).unwrap();
    vault.set_secret("api.token", SecretValue::from("two")).unwrap();
    assert_eq!(vault.get_secret("api.token").unwrap().plaintext(), "two");
    assert_eq!(vault.list_secrets().unwrap(), vec!["api.token"]);
}

#[test]
fn list_is_sorted() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();
    for name in ["zeta", "alpha", "mid"] {
        vault.set_secret(name, SecretValue::from("x")).unwrap();
    }
    assert_eq!(vault.list_secrets().unwrap(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn secret_names_are_validated() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();

    for bad in ["bad key!", ""] {
        assert!(matches!(
            vault.set_secret(bad, SecretValue::from("v")),
            Err(VaultError::InvalidKey(_))
        ));
        assert!(matches!(vault.get_secret(bad), Err(VaultError::InvalidKey(_))));
    }
    vault.set_secret("a.b-c_9", SecretValue::from("v")).unwrap();
}

#[test]
fn empty_and_unicode_values_survive() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();
    vault.set_secret("empty", SecretValue::from("")).unwrap();
    vault.set_secret("uni", SecretValue::from("pässwörd ✓")).unwrap();
    vault.close().unwrap();

    let vault = Aes256Vault::open(&config).unwrap();
    assert_eq!(vault.get_secret("empty").unwrap().plaintext(), "");
    assert_eq!(vault.get_secret("uni").unwrap().plaintext(), "pässwörd ✓");
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn reopen_keeps_secrets_and_created_timestamp() {
    let (_dir, config, _key) = setup();

    let vault = Aes256Vault::open(&config).unwrap();
    let created = vault.metadata().unwrap();
    thread::sleep(std::time::Duration::from_millis(5));
    vault.set_secret("db.password", SecretValue::from("hunter2")).unwrap();
    let after_set = vault.metadata().unwrap();
    vault.close().unwrap();

    let vault = Aes256Vault::open(&config).unwrap();
    let meta = vault.metadata().unwrap();
    assert_eq!(vault.get_secret("db.password").unwrap().plaintext(), "hunter2");
    assert_eq!(meta.created, created.created);
    assert_eq!(meta.last_modified, after_set.last_modified);
    assert!(meta.last_modified > created.last_modified);
}

#[test]
fn first_open_creates_the_vault_file() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();
    assert!(vault.path().exists());
    assert!(vault.path().ends_with("vault-test.enc"));
    assert!(vault.list_secrets().unwrap().is_empty());
}

#[test]
fn wrong_key_cannot_open_existing_vault() {
    let (dir, config, _key) = setup();
    Aes256Vault::open(&config).unwrap();

    let other = write_key(dir.path(), "other.key", &generate_key());
    let wrong = Config::new("test", ProviderType::Aes256)
        .with_storage_path(dir.path().join("store").to_string_lossy())
        .with_key_from_file(other.to_string_lossy());
    assert!(matches!(
        Aes256Vault::open(&wrong),
        Err(VaultError::DecryptionFailed(_))
    ));
}

#[test]
fn corrupt_plaintext_state_is_reported() {
    let (dir, config, key) = setup();
    let store = dir.path().join("store");
    fs::create_dir_all(&store).unwrap();
    let ct = encrypt_value(key.as_str(), b"{\"not\": \"a state\"}").unwrap();
    fs::write(store.join("vault-test.enc"), ct).unwrap();

    assert!(matches!(
        Aes256Vault::open(&config),
        Err(VaultError::VaultCorrupt { .. })
    ));
}

// ---------------------------------------------------------------------------
// Key resolution
// ---------------------------------------------------------------------------

#[test]
fn falls_back_to_later_key_source() {
    let (dir, config, good) = setup();
    Aes256Vault::open(&config)
        .unwrap()
        .set_secret("k", SecretValue::from("v"))
        .unwrap();

    // A rotated-in key listed first does not decrypt the vault; the old
    // key listed second does.
    let bad = write_key(dir.path(), "new.key", &generate_key());
    let good_path = write_key(dir.path(), "old.key", &good);
    let rotated = Config::new("test", ProviderType::Aes256)
        .with_storage_path(dir.path().join("store").to_string_lossy())
        .with_key_from_file(bad.to_string_lossy())
        .with_key_from_file(good_path.to_string_lossy());

    let vault = Aes256Vault::open(&rotated).unwrap();
    assert_eq!(vault.get_secret("k").unwrap().plaintext(), "v");
}

#[test]
fn env_key_source_is_used() {
    let dir = TempDir::new().unwrap();
    let var = "COFFER_AES_TEST_ENV_KEY_SOURCE";
    std::env::set_var(var, generate_key().as_str());

    let config = Config::new("envtest", ProviderType::Aes256)
        .with_storage_path(dir.path().to_string_lossy())
        .with_key_from_env(var);
    let vault = Aes256Vault::open(&config).unwrap();
    vault.set_secret("k", SecretValue::from("v")).unwrap();
    assert!(vault.has_secret("k").unwrap());
}

#[test]
fn no_resolvable_key_is_no_access() {
    let dir = TempDir::new().unwrap();
    let config = Config::new("nokey", ProviderType::Aes256)
        .with_storage_path(dir.path().to_string_lossy())
        .with_key_from_env("COFFER_AES_TEST_NEVER_SET")
        .with_key_from_file(dir.path().join("missing.key").to_string_lossy());
    assert!(matches!(
        Aes256Vault::open(&config),
        Err(VaultError::NoAccess(_))
    ));
}

// ---------------------------------------------------------------------------
// Atomic writes
// ---------------------------------------------------------------------------

#[test]
fn crash_before_rename_leaves_previous_vault_readable() {
    let (_dir, config, key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();
    vault.set_secret("k", SecretValue::from("v1")).unwrap();
    let path = vault.path().to_path_buf();
    vault.close().unwrap();

    // Stage a newer state but never commit it.
    let mut next = VaultState::new("test");
    next.secrets.insert("k".into(), "v2".into());
    let ct = encrypt_value(key.as_str(), &next.to_json().unwrap()).unwrap();
    let staged = persist::stage(&path, ct.as_bytes()).unwrap();
    assert!(staged.exists());

    let vault = Aes256Vault::open(&config).unwrap();
    assert_eq!(vault.get_secret("k").unwrap().plaintext(), "v1");

    // The next real write replaces the stale temp file.
    vault.set_secret("k", SecretValue::from("v3")).unwrap();
    assert!(!staged.exists());
}

// ---------------------------------------------------------------------------
// Concurrency and lifecycle
// ---------------------------------------------------------------------------

#[test]
fn concurrent_writers_do_not_lose_updates() {
    let (_dir, config, _key) = setup();
    let vault = Arc::new(Aes256Vault::open(&config).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let vault = Arc::clone(&vault);
            thread::spawn(move || {
                for j in 0..5 {
                    let name = format!("t{i}-{j}");
                    vault.set_secret(&name, SecretValue::from(name.as_str())).unwrap();
                    assert!(vault.has_secret(&name).unwrap());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(vault.list_secrets().unwrap().len(), 40);
    vault.close().unwrap();
    let reopened = Aes256Vault::open(&config).unwrap();
    assert_eq!(reopened.list_secrets().unwrap().len(), 40);
}

#[test]
fn closed_vault_rejects_operations() {
    let (_dir, config, _key) = setup();
    let vault = Aes256Vault::open(&config).unwrap();
    vault.close().unwrap();
    vault.close().unwrap();

    assert!(matches!(vault.get_secret("k"), Err(VaultError::VaultClosed(_))));
    assert!(matches!(vault.list_secrets(), Err(VaultError::VaultClosed(_))));
    assert!(matches!(vault.metadata(), Err(VaultError::VaultClosed(_))));
}

#[test]
fn factory_opens_aes_vault_without_recipient_capability() {
    let (_dir, config, _key) = setup();
    let provider = vault::open(&config).unwrap();
    assert_eq!(provider.id(), "test");
    assert!(provider.recipient_manager().is_none());
}
