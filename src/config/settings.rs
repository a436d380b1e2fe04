use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};
use crate::vault::state::validate_vault_id;

/// Environment variable consulted when no key/identity source is configured.
pub const DEFAULT_VAULT_KEY_ENV: &str = "VAULT_KEY";

/// Which backend holds a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Shared-key AES-256-GCM vault.
    Aes256,
    /// Multi-recipient age vault.
    Age,
    /// Plaintext JSON vault.
    Unencrypted,
    /// OS keyring.
    Keyring,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256 => "aes256",
            Self::Age => "age",
            Self::Unencrypted => "unencrypted",
            Self::Keyring => "keyring",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aes256" | "aes" => Ok(Self::Aes256),
            "age" => Ok(Self::Age),
            "unencrypted" | "plaintext" => Ok(Self::Unencrypted),
            "keyring" => Ok(Self::Keyring),
            other => Err(VaultError::InvalidConfig(format!(
                "unsupported vault type: {other}"
            ))),
        }
    }
}

/// Where a key or identity comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Env,
    File,
}

/// A location of symmetric key material or an age identity.
///
/// Serialized as `{"type": "env", "name": "..."}` or
/// `{"type": "file", "path": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Environment variable name (for `env` sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// File path (for `file` sources).
    #[serde(default, alias = "fullPath", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Identity sources share the key source shape.
pub type IdentitySource = KeySource;

impl KeySource {
    pub fn env(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Env,
            name: Some(name.into()),
            path: None,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::File,
            name: None,
            path: Some(path.into()),
        }
    }

    /// Short description used in logs and errors (`env:NAME`, `file:PATH`).
    pub fn describe(&self) -> String {
        match self.kind {
            SourceKind::Env => format!("env:{}", self.name.as_deref().unwrap_or("")),
            SourceKind::File => format!("file:{}", self.path.as_deref().unwrap_or("")),
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        match self.kind {
            SourceKind::Env if self.name.as_deref().map_or(true, str::is_empty) => Err(
                VaultError::InvalidConfig(format!("name is required for env {what} source")),
            ),
            SourceKind::File if self.path.as_deref().map_or(true, str::is_empty) => Err(
                VaultError::InvalidConfig(format!("path is required for file {what} source")),
            ),
            _ => Ok(()),
        }
    }
}

/// Symmetric (AES-256-GCM) vault configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesConfig {
    /// Directory holding the vault file.
    pub storage_path: String,
    /// Key sources, in order of preference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_sources: Vec<KeySource>,
}

impl AesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.storage_path.trim().is_empty() {
            return Err(VaultError::InvalidConfig(
                "storage path is required for AES vault".into(),
            ));
        }
        self.key_sources.iter().try_for_each(|s| s.validate("key"))
    }
}

/// Asymmetric (age) vault configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeConfig {
    /// Directory holding the vault file.
    pub storage_path: String,
    /// Identity sources for decryption, in order of preference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identity_sources: Vec<IdentitySource>,
    /// Recipients used when the vault is first created.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
}

impl AgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.storage_path.trim().is_empty() {
            return Err(VaultError::InvalidConfig(
                "storage path is required for age vault".into(),
            ));
        }
        self.identity_sources
            .iter()
            .try_for_each(|s| s.validate("identity"))
    }
}

/// Plaintext JSON vault configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnencryptedConfig {
    pub storage_path: String,
}

impl UnencryptedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.storage_path.trim().is_empty() {
            return Err(VaultError::InvalidConfig(
                "storage path is required for unencrypted vault".into(),
            ));
        }
        Ok(())
    }
}

/// OS keyring vault configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyringConfig {
    /// Keyring service name entries are stored under.
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_service() -> String {
    "coffer".to_string()
}

impl Default for KeyringConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
        }
    }
}

/// Configuration of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub id: String,
    #[serde(rename = "type")]
    pub provider: ProviderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aes: Option<AesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<AgeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unencrypted: Option<UnencryptedConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyring: Option<KeyringConfig>,
}

impl Config {
    /// An otherwise empty config for vault `id` of the given type.
    pub fn new(id: impl Into<String>, provider: ProviderType) -> Self {
        Self {
            id: id.into(),
            provider,
            aes: None,
            age: None,
            unencrypted: None,
            keyring: None,
        }
    }

    /// Check that the config is complete and consistent.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(VaultError::InvalidConfig("vault ID is required".into()));
        }
        validate_vault_id(&self.id)?;

        match self.provider {
            ProviderType::Aes256 => self
                .aes
                .as_ref()
                .ok_or_else(|| missing("aes", "aes256"))?
                .validate(),
            ProviderType::Age => self
                .age
                .as_ref()
                .ok_or_else(|| missing("age", "age"))?
                .validate(),
            ProviderType::Unencrypted => self
                .unencrypted
                .as_ref()
                .ok_or_else(|| missing("unencrypted", "unencrypted"))?
                .validate(),
            ProviderType::Keyring => {
                let keyring = self
                    .keyring
                    .as_ref()
                    .ok_or_else(|| missing("keyring", "keyring"))?;
                if keyring.service.trim().is_empty() {
                    return Err(VaultError::InvalidConfig(
                        "service is required for keyring vault".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Set the storage directory of the selected file-backed provider.
    pub fn with_storage_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        match self.provider {
            ProviderType::Aes256 => {
                self.aes.get_or_insert_with(Default::default).storage_path = path
            }
            ProviderType::Age => {
                self.age.get_or_insert_with(Default::default).storage_path = path
            }
            ProviderType::Unencrypted => {
                self.unencrypted
                    .get_or_insert_with(Default::default)
                    .storage_path = path
            }
            ProviderType::Keyring => {}
        }
        self
    }

    /// Read the AES key from an environment variable.
    pub fn with_key_from_env(mut self, name: impl Into<String>) -> Self {
        self.aes
            .get_or_insert_with(Default::default)
            .key_sources
            .push(KeySource::env(name));
        self
    }

    /// Read the AES key from a file.
    pub fn with_key_from_file(mut self, path: impl Into<String>) -> Self {
        self.aes
            .get_or_insert_with(Default::default)
            .key_sources
            .push(KeySource::file(path));
        self
    }

    /// Read an age identity from an environment variable.
    pub fn with_identity_from_env(mut self, name: impl Into<String>) -> Self {
        self.age
            .get_or_insert_with(Default::default)
            .identity_sources
            .push(KeySource::env(name));
        self
    }

    /// Read age identities from a file.
    pub fn with_identity_from_file(mut self, path: impl Into<String>) -> Self {
        self.age
            .get_or_insert_with(Default::default)
            .identity_sources
            .push(KeySource::file(path));
        self
    }

    /// Add initial recipients for a new age vault.
    pub fn with_recipients<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.age
            .get_or_insert_with(Default::default)
            .recipients
            .extend(recipients.into_iter().map(Into::into));
        self
    }

    /// Use a specific keyring service name.
    pub fn with_keyring_service(mut self, service: impl Into<String>) -> Self {
        self.keyring = Some(KeyringConfig {
            service: service.into(),
        });
        self
    }
}

fn missing(section: &str, provider: &str) -> VaultError {
    VaultError::InvalidConfig(format!(
        "{section} configuration required for the {provider} vault provider"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_valid_aes_config() {
        let cfg = Config::new("dev", ProviderType::Aes256)
            .with_storage_path("/tmp/vaults")
            .with_key_from_env("DEV_KEY")
            .with_key_from_file("/tmp/keys/dev.key");
        cfg.validate().unwrap();
        let aes = cfg.aes.unwrap();
        assert_eq!(aes.key_sources.len(), 2);
        assert_eq!(aes.key_sources[0].describe(), "env:DEV_KEY");
    }

    #[test]
    fn aes_without_key_sources_is_valid() {
        let cfg = Config::new("dev", ProviderType::Aes256).with_storage_path("/tmp/v");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_backend_section_is_invalid() {
        let cfg = Config::new("dev", ProviderType::Age);
        assert!(matches!(cfg.validate(), Err(VaultError::InvalidConfig(_))));
    }

    #[test]
    fn empty_storage_path_is_invalid() {
        let cfg = Config::new("dev", ProviderType::Unencrypted).with_storage_path("  ");
        assert!(matches!(cfg.validate(), Err(VaultError::InvalidConfig(_))));
    }

    #[test]
    fn env_source_without_name_is_invalid() {
        let mut cfg = Config::new("dev", ProviderType::Age).with_storage_path("/tmp/v");
        if let Some(age) = cfg.age.as_mut() {
            age.identity_sources.push(KeySource {
                kind: SourceKind::Env,
                name: None,
                path: None,
            });
        }
        assert!(matches!(cfg.validate(), Err(VaultError::InvalidConfig(_))));
    }

    #[test]
    fn empty_id_is_invalid() {
        let cfg = Config::new("", ProviderType::Unencrypted).with_storage_path("/tmp/v");
        assert!(matches!(cfg.validate(), Err(VaultError::InvalidConfig(_))));
    }

    #[test]
    fn provider_type_parses_aliases() {
        assert_eq!("aes".parse::<ProviderType>().unwrap(), ProviderType::Aes256);
        assert_eq!("age".parse::<ProviderType>().unwrap(), ProviderType::Age);
        assert!("external".parse::<ProviderType>().is_err());
    }
}
