//! Plaintext JSON vault.  Same state and atomic writes, no encryption.

use std::path::Path;

use zeroize::Zeroizing;

use super::engine::{Engine, Seal};
use super::persist;
use super::secret::SecretValue;
use super::state::{Metadata, VaultState};
use super::Provider;
use crate::config::{Config, ProviderType};
use crate::errors::{Result, VaultError};
use crate::paths::expand_path;

/// File name of the plaintext vault `id`.
pub fn vault_file_name(id: &str) -> String {
    format!("vault-{id}.json")
}

struct PrettyJson;

impl Seal for PrettyJson {
    fn seal(&self, state: &VaultState) -> Result<Zeroizing<Vec<u8>>> {
        state.to_json_pretty()
    }
}

/// An open plaintext vault.
pub struct UnencryptedVault {
    engine: Engine<PrettyJson>,
}

impl UnencryptedVault {
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.provider != ProviderType::Unencrypted {
            return Err(VaultError::InvalidConfig(format!(
                "cannot open a {} vault as unencrypted",
                config.provider
            )));
        }
        let cfg = config
            .unencrypted
            .as_ref()
            .ok_or_else(|| VaultError::InvalidConfig("unencrypted configuration required".into()))?;

        let path = expand_path(&cfg.storage_path)?.join(vault_file_name(&config.id));
        let engine = match persist::read_existing(&path)? {
            Some(data) => {
                let state = VaultState::from_json(&Zeroizing::new(data), &path)?;
                Engine::loaded(&config.id, path, state, PrettyJson)
            }
            None => {
                tracing::warn!(
                    vault = %config.id,
                    "creating an unencrypted vault; secrets are stored in plain text"
                );
                Engine::create(&config.id, path, VaultState::new(&config.id), PrettyJson)?
            }
        };
        Ok(Self { engine })
    }

    /// Location of the vault file.
    pub fn path(&self) -> &Path {
        self.engine.path()
    }
}

impl Provider for UnencryptedVault {
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
