//! The serialized vault state and secret-name validation.
//!
//! Every engine encrypts (or, for the plaintext provider, writes) the
//! whole `VaultState` as one JSON document.  There is no per-secret
//! nonce or key.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Result, VaultError};

/// Current on-disk schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Creation and modification timestamps of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub created: DateTime<Utc>,
    #[serde(alias = "last_modified")]
    pub last_modified: DateTime<Utc>,
}

impl Metadata {
    /// Both timestamps set to now.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            last_modified: now,
        }
    }

    /// Record a successful mutation.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// The complete contents of one vault.
///
/// Secret values are wiped when the state is dropped.
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultState {
    pub version: u32,
    pub id: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    /// Public keys of the vault's recipients (asymmetric vaults only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
}

impl VaultState {
    /// A fresh, empty state for vault `id`.
    pub fn new(id: &str) -> Self {
        Self {
            version: CURRENT_VERSION,
            id: id.to_string(),
            metadata: Metadata::now(),
            secrets: BTreeMap::new(),
            recipients: Vec::new(),
        }
    }

    /// Serialize to JSON.  The buffer is wiped when dropped.
    pub fn to_json(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| VaultError::SerializationError(format!("vault state: {e}")))
    }

    /// Serialize to indented JSON (plaintext provider).
    pub fn to_json_pretty(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec_pretty(self)
            .map(Zeroizing::new)
            .map_err(|e| VaultError::SerializationError(format!("vault state: {e}")))
    }

    /// Parse and check a state read from `path`.
    pub fn from_json(data: &[u8], path: &Path) -> Result<Self> {
        let state: VaultState =
            serde_json::from_slice(data).map_err(|e| VaultError::VaultCorrupt {
                path: path.to_path_buf(),
                reason: format!("state is not valid JSON: {e}"),
            })?;

        if state.version != CURRENT_VERSION {
            return Err(VaultError::VaultCorrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported version {}, expected {CURRENT_VERSION}",
                    state.version
                ),
            });
        }

        if let Some(bad) = state.secrets.keys().find(|k| validate_secret_key(k).is_err()) {
            return Err(VaultError::VaultCorrupt {
                path: path.to_path_buf(),
                reason: format!("invalid secret name '{bad}' in state"),
            });
        }

        Ok(state)
    }

    /// Sorted secret names.
    pub fn names(&self) -> Vec<String> {
        self.secrets.keys().cloned().collect()
    }
}

impl Drop for VaultState {
    fn drop(&mut self) {
        for value in self.secrets.values_mut() {
            value.zeroize();
        }
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9\-_.]+$").expect("literal secret name pattern"))
}

/// Validate a secret name.
///
/// Allowed: ASCII letters, digits, hyphens, underscores and periods.
/// Must be non-empty.
pub fn validate_secret_key(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::InvalidKey("secret name cannot be empty".into()));
    }
    if !key_pattern().is_match(name) {
        return Err(VaultError::InvalidKey(format!(
            "secret name '{}' must only contain letters, digits, dashes, underscores and dots",
            name.escape_debug()
        )));
    }
    Ok(())
}

/// Validate a vault id.  Ids end up in file names, so they follow the
/// same rules as secret names.
pub fn validate_vault_id(id: &str) -> Result<()> {
    validate_secret_key(id).map_err(|_| {
        VaultError::InvalidConfig(format!("vault id '{}' is invalid", id.escape_debug()))
    })
}
