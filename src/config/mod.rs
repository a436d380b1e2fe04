//! Vault configuration: types, validation and JSON/TOML files.

pub mod settings;

use std::fs;
use std::path::Path;

pub use settings::{
    AesConfig, AgeConfig, Config, IdentitySource, KeySource, KeyringConfig, ProviderType,
    SourceKind, UnencryptedConfig, DEFAULT_VAULT_KEY_ENV,
};

use crate::errors::{Result, VaultError};

impl Config {
    /// Load a config file.
    ///
    /// The format follows the extension: `.toml` is parsed as TOML,
    /// anything else as JSON.  The loaded config is not validated;
    /// `vault::open` does that.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            VaultError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;

        if is_toml(path) {
            toml::from_str(&contents).map_err(|e| {
                VaultError::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
            })
        } else {
            serde_json::from_str(&contents).map_err(|e| {
                VaultError::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
            })
        }
    }

    /// Save the config, creating parent directories.  Owner-only on Unix.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| VaultError::SerializationError(format!("config: {e}")))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| VaultError::SerializationError(format!("config: {e}")))?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
