//! Shared-key vault: the whole state sealed with AES-256-GCM.
//!
//! The vault file holds the base64 of `nonce || ciphertext || tag` of the
//! JSON state.  Keys come from the configured sources (default: the
//! `VAULT_KEY` environment variable).  When several keys resolve, the
//! first one that authenticates the file becomes the active key, which
//! lets a rotated key be listed ahead of the old one.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use super::engine::{Engine, Seal};
use super::persist;
use super::resolver::{try_decrypt, KeyResolver};
use super::secret::SecretValue;
use super::state::{Metadata, VaultState};
use super::Provider;
use crate::config::{Config, ProviderType};
use crate::crypto::{encrypt_value, EncryptionKey};
use crate::errors::{Result, VaultError};
use crate::paths::expand_path;

/// File name of the symmetric vault `id`.
pub fn vault_file_name(id: &str) -> String {
    format!("vault-{id}.enc")
}

struct AesSeal {
    key: EncryptionKey,
}

impl Seal for AesSeal {
    fn seal(&self, state: &VaultState) -> Result<Zeroizing<Vec<u8>>> {
        let json = state.to_json()?;
        let ciphertext = encrypt_value(self.key.as_str(), &json)?;
        Ok(Zeroizing::new(ciphertext.into_bytes()))
    }
}

/// An open AES-256-GCM vault.
pub struct Aes256Vault {
    engine: Engine<AesSeal>,
}

impl Aes256Vault {
    /// Open the vault described by `config`, creating it on first use.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.provider != ProviderType::Aes256 {
            return Err(VaultError::InvalidConfig(format!(
                "cannot open a {} vault as aes256",
                config.provider
            )));
        }
        let aes = config
            .aes
            .as_ref()
            .ok_or_else(|| VaultError::InvalidConfig("aes configuration required".into()))?;

        let dir = expand_path(&aes.storage_path)?;
        let path = dir.join(vault_file_name(&config.id));
        let keys = KeyResolver::new(&aes.key_sources).resolve_keys()?;

        let engine = match persist::read_existing(&path)? {
            Some(data) => {
                let text = String::from_utf8(data).map_err(|_| VaultError::VaultCorrupt {
                    path: path.clone(),
                    reason: "vault file is not text".into(),
                })?;
                let (plaintext, key) = try_decrypt(&keys, &text)?;
                let state = VaultState::from_json(&plaintext, &path)?;
                if state.id != config.id {
                    tracing::warn!(
                        vault = %config.id,
                        stored = %state.id,
                        path = %path.display(),
                        "vault file belongs to a different id"
                    );
                }
                tracing::debug!(vault = %config.id, secrets = state.secrets.len(), "opened vault");
                Engine::loaded(&config.id, path, state, AesSeal { key })
            }
            None => {
                let key = first_usable_key(keys)?;
                Engine::create(&config.id, path, VaultState::new(&config.id), AesSeal { key })?
            }
        };

        Ok(Self { engine })
    }

    /// Location of the vault file.
    pub fn path(&self) -> &Path {
        self.engine.path()
    }
}

/// The key a new vault is sealed with: the first resolved one, which
/// must be a well-formed 256-bit key.
fn first_usable_key(keys: Vec<EncryptionKey>) -> Result<EncryptionKey> {
    let key = keys
        .into_iter()
        .next()
        .ok_or_else(|| VaultError::NoAccess("no encryption key resolved".into()))?;
    key.decode()?;
    Ok(key)
}

impl Provider for Aes256Vault {
    fn id(&self) -> &str {
        self.engine.id()
    }

    fn get_secret(&self, key: &str) -> Result<SecretValue> {
        self.engine.get_secret(key)
    }

    fn set_secret(&self, key: &str, value: SecretValue) -> Result<()> {
        self.engine.set_secret(key, value)
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.engine.delete_secret(key)
    }

    fn list_secrets(&self) -> Result<Vec<String>> {
        self.engine.list_secrets()
    }

    fn has_secret(&self, key: &str) -> Result<bool> {
        self.engine.has_secret(key)
    }

    fn metadata(&self) -> Result<Metadata> {
        self.engine.metadata()
    }

    fn close(&self) -> Result<()> {
        self.engine.close();
        Ok(())
    }
}

/// Where `config` would put its symmetric vault file.
pub fn vault_path(config: &Config) -> Result<PathBuf> {
    let aes = config
        .aes
        .as_ref()
        .ok_or_else(|| VaultError::InvalidConfig("aes configuration required".into()))?;
    Ok(expand_path(&aes.storage_path)?.join(vault_file_name(&config.id)))
}
