//! Vault providers.
//!
//! This module provides:
//! - the `Provider` contract every backend implements, plus the optional
//!   `RecipientManager` capability
//! - `open`, which picks the backend named by a `Config`
//! - the shared-key (`aes_vault`), multi-recipient (`age_vault`) and
//!   plaintext (`unencrypted`) engines
//! - `SecretValue` (`secret`), the persisted state (`state`), atomic file
//!   writes (`persist`) and key/identity resolution (`resolver`)

pub mod aes_vault;
pub mod age_vault;
pub(crate) mod engine;
pub mod persist;
pub mod resolver;
pub mod secret;
pub mod state;
pub mod unencrypted;

pub use aes_vault::Aes256Vault;
pub use age_vault::{generate_age_identity, AgeKeyPair, AgeVault};
pub use resolver::{try_decrypt, IdentityResolver, KeyResolver};
pub use secret::SecretValue;
pub use state::{validate_secret_key, Metadata, VaultState};
pub use unencrypted::UnencryptedVault;

use crate::config::{Config, ProviderType};
use crate::crypto::{decrypt_value, encrypt_value, EncryptionKey};
use crate::errors::{Result, VaultError};

/// The uniform interface to one open vault.
///
/// Implementations are safe to share between threads: reads run
/// concurrently, writes are serialized.  Every operation on a closed
/// vault fails with `VaultError::VaultClosed`.
pub trait Provider: Send + Sync {
    /// The vault id this provider was opened with.
    fn id(&self) -> &str;

    /// Fetch a secret, or `SecretNotFound`.
    fn get_secret(&self, key: &str) -> Result<SecretValue>;

    /// Insert or replace a secret and persist the vault.
    ///
    /// The value is zeroed once it has been stored (or rejected).
    fn set_secret(&self, key: &str, value: SecretValue) -> Result<()>;

    /// Remove a secret and persist the vault, or `SecretNotFound`.
    fn delete_secret(&self, key: &str) -> Result<()>;

    /// Secret names, sorted.
    fn list_secrets(&self) -> Result<Vec<String>>;

    fn has_secret(&self, key: &str) -> Result<bool>;

    fn metadata(&self) -> Result<Metadata>;

    /// Drop in-memory state and key material.  Safe to call twice.
    fn close(&self) -> Result<()>;

    /// The recipient-management capability, if this backend has one.
    fn recipient_manager(&self) -> Option<&dyn RecipientManager> {
        None
    }
}

/// Recipient management for multi-recipient vaults.
pub trait RecipientManager: Send + Sync {
    /// Add a recipient and re-encrypt.  Adding a present recipient is a no-op.
    fn add_recipient(&self, public_key: &str) -> Result<()>;

    /// Remove a recipient and re-encrypt.
    ///
    /// Fails with `RecipientNotFound` for unknown keys and with
    /// `LastRecipient` when it would leave the vault without recipients.
    fn remove_recipient(&self, public_key: &str) -> Result<()>;

    /// A copy of the current recipients.
    fn list_recipients(&self) -> Result<Vec<String>>;
}

/// Probe a provider for recipient management.
pub fn recipient_management(provider: &dyn Provider) -> Option<&dyn RecipientManager> {
    provider.recipient_manager()
}

/// Open the vault described by `config`.
pub fn open(config: &Config) -> Result<Box<dyn Provider>> {
    config.validate()?;
    tracing::debug!(vault = %config.id, provider = %config.provider, "opening vault");

    match config.provider {
        ProviderType::Aes256 => Ok(Box::new(Aes256Vault::open(config)?)),
        ProviderType::Age => Ok(Box::new(AgeVault::open(config)?)),
        ProviderType::Unencrypted => Ok(Box::new(UnencryptedVault::open(config)?)),
        #[cfg(feature = "keyring-store")]
        ProviderType::Keyring => Ok(Box::new(crate::keyring::KeyringVault::open(config)?)),
        #[cfg(not(feature = "keyring-store"))]
        ProviderType::Keyring => Err(VaultError::InvalidConfig(
            "keyring vaults need the `keyring-store` feature".into(),
        )),
    }
}

/// Check that `key` is usable as a shared vault key by sealing and
/// opening a probe value with it.
pub fn validate_encryption_key(key: &EncryptionKey) -> Result<()> {
    const PROBE: &[u8] = b"coffer key check";
    let ciphertext = encrypt_value(key.as_str(), PROBE)?;
    let plaintext = decrypt_value(key.as_str(), &ciphertext)?;
    if plaintext.as_slice() != PROBE {
        return Err(VaultError::InvalidKey("key failed the round-trip check".into()));
    }
    Ok(())
}
