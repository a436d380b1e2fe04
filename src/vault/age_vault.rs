//! Multi-recipient vault: the whole state sealed as an age file.
//!
//! Every write re-encrypts for the recipients currently listed in the
//! state, so adding or removing a recipient takes effect on the next
//! (immediate) persist.  Reading needs any identity matching one of
//! those recipients.

use std::io::{Read, Write};
use std::path::Path;

use age::secrecy::ExposeSecret;
use zeroize::Zeroizing;

use super::engine::{Engine, Seal};
use super::persist;
use super::resolver::IdentityResolver;
use super::secret::SecretValue;
use super::state::{Metadata, VaultState};
use super::{Provider, RecipientManager};
use crate::config::{Config, ProviderType};
use crate::errors::{Result, VaultError};
use crate::paths::expand_path;

/// File name of the age vault `id`.
pub fn vault_file_name(id: &str) -> String {
    format!("vault-{id}.age")
}

/// A freshly generated X25519 key pair.
pub struct AgeKeyPair {
    /// `AGE-SECRET-KEY-1...`
    pub identity: Zeroizing<String>,
    /// `age1...`
    pub recipient: String,
}

/// Generate a new age identity and its recipient.
pub fn generate_age_identity() -> AgeKeyPair {
    let identity = age::x25519::Identity::generate();
    AgeKeyPair {
        identity: Zeroizing::new(identity.to_string().expose_secret().to_string()),
        recipient: identity.to_public().to_string(),
    }
}

/// Parse a recipient, returning it in canonical string form.
pub fn parse_recipient(public_key: &str) -> Result<age::x25519::Recipient> {
    public_key
        .trim()
        .parse::<age::x25519::Recipient>()
        .map_err(|e| VaultError::InvalidRecipient {
            recipient: public_key.to_string(),
            reason: e.to_string(),
        })
}

struct AgeSeal {
    identities: Vec<age::x25519::Identity>,
}

impl AgeSeal {
    /// Whether any local identity is among `recipients`.
    fn can_read(&self, recipients: &[String]) -> bool {
        self.identities
            .iter()
            .map(|identity| identity.to_public().to_string())
            .any(|public| recipients.contains(&public))
    }

    fn open(&self, data: &[u8], path: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let decryptor = match age::Decryptor::new(data).map_err(|e| VaultError::VaultCorrupt {
            path: path.to_path_buf(),
            reason: format!("not an age file: {e}"),
        })? {
            age::Decryptor::Recipients(d) => d,
            _ => {
                return Err(VaultError::VaultCorrupt {
                    path: path.to_path_buf(),
                    reason: "vault is passphrase-encrypted".into(),
                })
            }
        };

        let mut reader = decryptor
            .decrypt(self.identities.iter().map(|i| i as &dyn age::Identity))
            .map_err(|e| match e {
                age::DecryptError::NoMatchingKeys => VaultError::DecryptionFailed(format!(
                    "none of the {} resolved identities is a recipient of {}",
                    self.identities.len(),
                    path.display()
                )),
                other => VaultError::DecryptionFailed(other.to_string()),
            })?;

        let mut plaintext = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut plaintext)
            .map_err(|e| VaultError::DecryptionFailed(e.to_string()))?;
        Ok(plaintext)
    }
}

impl Seal for AgeSeal {
    fn seal(&self, state: &VaultState) -> Result<Zeroizing<Vec<u8>>> {
        let recipients = state
            .recipients
            .iter()
            .map(|r| parse_recipient(r).map(|r| Box::new(r) as Box<dyn age::Recipient + Send>))
            .collect::<Result<Vec<_>>>()?;

        let encryptor = age::Encryptor::with_recipients(recipients).ok_or_else(|| {
            VaultError::InvalidConfig("no recipients available for encryption".into())
        })?;

        let json = state.to_json()?;
        let mut out = Vec::new();
        let mut writer = encryptor
            .wrap_output(&mut out)
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;
        writer
            .write_all(&json)
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;
        Ok(Zeroizing::new(out))
    }
}

/// An open age vault.
pub struct AgeVault {
    engine: Engine<AgeSeal>,
}

impl AgeVault {
    /// Open the vault described by `config`, creating it on first use
    /// for the configured recipients.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.provider != ProviderType::Age {
            return Err(VaultError::InvalidConfig(format!(
                "cannot open a {} vault as age",
                config.provider
            )));
        }
        let age_cfg = config
            .age
            .as_ref()
            .ok_or_else(|| VaultError::InvalidConfig("age configuration required".into()))?;

        let path = expand_path(&age_cfg.storage_path)?.join(vault_file_name(&config.id));
        let identities = IdentityResolver::new(&age_cfg.identity_sources).resolve_identities()?;
        let seal = AgeSeal { identities };

        let engine = match persist::read_existing(&path)? {
            Some(data) => {
                let plaintext = seal.open(&data, &path)?;
                let state = VaultState::from_json(&plaintext, &path)?;
                if state.recipients.is_empty() {
                    return Err(VaultError::VaultCorrupt {
                        path,
                        reason: "vault lists no recipients".into(),
                    });
                }
                if state.id != config.id {
                    tracing::warn!(
                        vault = %config.id,
                        stored = %state.id,
                        path = %path.display(),
                        "vault file belongs to a different id"
                    );
                }
                tracing::debug!(
                    vault = %config.id,
                    secrets = state.secrets.len(),
                    recipients = state.recipients.len(),
                    "opened vault"
                );
                Engine::loaded(&config.id, path, state, seal)
            }
            None => {
                let mut state = VaultState::new(&config.id);
                for recipient in &age_cfg.recipients {
                    let canonical = parse_recipient(recipient)?.to_string();
                    if !state.recipients.contains(&canonical) {
                        state.recipients.push(canonical);
                    }
                }
                if state.recipients.is_empty() {
                    return Err(VaultError::InvalidConfig(
                        "at least one recipient is required to create an age vault".into(),
                    ));
                }
                if !seal.can_read(&state.recipients) {
                    tracing::warn!(
                        vault = %config.id,
                        "none of the local identities is a recipient; this vault will not be readable here"
                    );
                }
                Engine::create(&config.id, path, state, seal)?
            }
        };

        Ok(Self { engine })
    }

    /// Location of the vault file.
    pub fn path(&self) -> &Path {
        self.engine.path()
    }
}

impl Provider for AgeVault {
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

    fn recipient_manager(&self) -> Option<&dyn RecipientManager> {
        Some(self)
    }
}

impl RecipientManager for AgeVault {
    fn add_recipient(&self, public_key: &str) -> Result<()> {
        let canonical = parse_recipient(public_key)?.to_string();
        let mut added = false;
        self.engine.mutate(|state| {
            if state.recipients.contains(&canonical) {
                return Ok(false);
            }
            state.recipients.push(canonical.clone());
            added = true;
            Ok(true)
        })?;
        if added {
            tracing::info!(vault = %self.engine.id(), recipient = %canonical, "recipient added");
        }
        Ok(())
    }

    fn remove_recipient(&self, public_key: &str) -> Result<()> {
        let wanted = public_key.trim();
        let canonical = parse_recipient(wanted).ok().map(|r| r.to_string());

        self.engine.mutate(|state| {
            if state.recipients.len() <= 1 {
                return Err(VaultError::LastRecipient(wanted.to_string()));
            }
            let idx = state
                .recipients
                .iter()
                .position(|r| r == wanted || Some(r) == canonical.as_ref())
                .ok_or_else(|| VaultError::RecipientNotFound(wanted.to_string()))?;
            state.recipients.remove(idx);
            Ok(true)
        })?;
        tracing::info!(vault = %self.engine.id(), recipient = %wanted, "recipient removed");

        self.engine.read(|loaded| {
            if !loaded.sealer.can_read(&loaded.state.recipients) {
                tracing::warn!(
                    vault = %self.engine.id(),
                    "no local identity is a recipient any more; the vault will not reopen here"
                );
            }
            Ok(())
        })
    }

    fn list_recipients(&self) -> Result<Vec<String>> {
        self.engine.read(|loaded| Ok(loaded.state.recipients.clone()))
    }
}
