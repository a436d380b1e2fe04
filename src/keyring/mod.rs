//! Vault stored in the OS keyring.
//!
//! Backends:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Each secret is its own entry.  Two bookkeeping entries sit next to
//! them: a sorted JSON list of secret names and the vault metadata.  All
//! entries live under the configured service name.

use parking_lot::RwLock;

use crate::config::{Config, ProviderType};
use crate::errors::{Result, VaultError};
use crate::vault::secret::SecretValue;
use crate::vault::state::{validate_secret_key, Metadata};
use crate::vault::Provider;

fn metadata_entry(id: &str) -> String {
    format!("{id}-metadata")
}

fn secret_entry(id: &str, key: &str) -> String {
    format!("{id}-secret-{key}")
}

fn list_entry(id: &str) -> String {
    format!("{id}-secrets-list")
}

/// An open keyring vault.
pub struct KeyringVault {
    id: String,
    service: String,
    /// `None` once closed.
    metadata: RwLock<Option<Metadata>>,
}

impl KeyringVault {
    /// Open the vault, writing fresh metadata if none is stored yet.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.provider != ProviderType::Keyring {
            return Err(VaultError::InvalidConfig(format!(
                "cannot open a {} vault as keyring",
                config.provider
            )));
        }
        let service = config
            .keyring
            .as_ref()
            .map(|k| k.service.clone())
            .ok_or_else(|| VaultError::InvalidConfig("keyring configuration required".into()))?;

        let vault = Self {
            id: config.id.clone(),
            service,
            metadata: RwLock::new(None),
        };

        let metadata = match vault.read_entry(&metadata_entry(&vault.id))? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                VaultError::KeyringError(format!(
                    "metadata of vault '{}' is unreadable: {e}",
                    vault.id
                ))
            })?,
            None => {
                let metadata = Metadata::now();
                vault.write_metadata(&metadata)?;
                tracing::info!(
                    vault = %vault.id,
                    service = %vault.service,
                    "created keyring vault"
                );
                metadata
            }
        };
        *vault.metadata.write() = Some(metadata);
        Ok(vault)
    }

    fn entry(&self, name: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, name)
            .map_err(|e| VaultError::KeyringError(format!("failed to create keyring entry: {e}")))
    }

    fn read_entry(&self, name: &str) -> Result<Option<String>> {
        match self.entry(name)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(VaultError::KeyringError(format!(
                "failed to read '{name}' from keyring: {e}"
            ))),
        }
    }

    fn write_entry(&self, name: &str, value: &str) -> Result<()> {
        self.entry(name)?.set_password(value).map_err(|e| {
            VaultError::KeyringError(format!("failed to store '{name}' in keyring: {e}"))
        })
    }

    fn delete_entry(&self, name: &str) -> Result<()> {
        match self.entry(name)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(VaultError::KeyringError(format!(
                "failed to delete '{name}' from keyring: {e}"
            ))),
        }
    }

    fn write_metadata(&self, metadata: &Metadata) -> Result<()> {
        let json = serde_json::to_string(metadata)
            .map_err(|e| VaultError::SerializationError(format!("metadata: {e}")))?;
        self.write_entry(&metadata_entry(&self.id), &json)
    }

    fn read_names(&self) -> Result<Vec<String>> {
        match self.read_entry(&list_entry(&self.id))? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                VaultError::KeyringError(format!(
                    "secret list of vault '{}' is unreadable: {e}",
                    self.id
                ))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write_names(&self, names: &[String]) -> Result<()> {
        let json = serde_json::to_string(names)
            .map_err(|e| VaultError::SerializationError(format!("secret list: {e}")))?;
        self.write_entry(&list_entry(&self.id), &json)
    }

    fn closed(&self) -> VaultError {
        VaultError::VaultClosed(self.id.clone())
    }

    /// Bump `last_modified` after a successful write.
    fn touch(&self, metadata: &mut Metadata) -> Result<()> {
        let mut next = *metadata;
        next.touch();
        self.write_metadata(&next)?;
        *metadata = next;
        Ok(())
    }
}

impl Provider for KeyringVault {
    fn id(&self) -> &str {
        &self.id
    }

    fn get_secret(&self, key: &str) -> Result<SecretValue> {
        validate_secret_key(key)?;
        let guard = self.metadata.read();
        guard.as_ref().ok_or_else(|| self.closed())?;
        self.read_entry(&secret_entry(&self.id, key))?
            .map(SecretValue::from)
            .ok_or_else(|| VaultError::SecretNotFound(key.to_string()))
    }

    fn set_secret(&self, key: &str, mut value: SecretValue) -> Result<()> {
        let result = (|| -> Result<()> {
            validate_secret_key(key)?;
            let mut guard = self.metadata.write();
            let metadata = guard.as_mut().ok_or_else(|| self.closed())?;

            let text = value.as_str().ok_or_else(|| {
                VaultError::SerializationError(format!(
                    "value of secret '{key}' is not valid UTF-8"
                ))
            })?;
            self.write_entry(&secret_entry(&self.id, key), text)?;

            let mut names = self.read_names()?;
            if !names.iter().any(|n| n == key) {
                names.push(key.to_string());
                names.sort();
                self.write_names(&names)?;
            }
            self.touch(metadata)
        })();
        value.zero();
        result
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        validate_secret_key(key)?;
        let mut guard = self.metadata.write();
        let metadata = guard.as_mut().ok_or_else(|| self.closed())?;

        let mut names = self.read_names()?;
        let Some(idx) = names.iter().position(|n| n == key) else {
            return Err(VaultError::SecretNotFound(key.to_string()));
        };
        self.delete_entry(&secret_entry(&self.id, key))?;
        names.remove(idx);
        self.write_names(&names)?;
        self.touch(metadata)
    }

    fn list_secrets(&self) -> Result<Vec<String>> {
        let guard = self.metadata.read();
        guard.as_ref().ok_or_else(|| self.closed())?;
        self.read_names()
    }

    fn has_secret(&self, key: &str) -> Result<bool> {
        validate_secret_key(key)?;
        let guard = self.metadata.read();
        guard.as_ref().ok_or_else(|| self.closed())?;
        Ok(self.read_names()?.iter().any(|n| n == key))
    }

    fn metadata(&self) -> Result<Metadata> {
        (*self.metadata.read()).ok_or_else(|| self.closed())
    }

    fn close(&self) -> Result<()> {
        self.metadata.write().take();
        Ok(())
    }
}
