//! Key and identity resolution.
//!
//! Both resolvers walk their configured sources in order.  A source that
//! yields nothing usable (unset variable, unreadable file, unparseable
//! content, insecure path) is skipped with a warning; resolution only
//! fails when no source yields anything.

use std::fs;

use zeroize::Zeroizing;

use crate::config::{KeySource, SourceKind, DEFAULT_VAULT_KEY_ENV};
use crate::crypto::{decrypt_value, EncryptionKey};
use crate::errors::{Result, VaultError};
use crate::paths::expand_path;

/// Read the raw, trimmed contents of one source.
///
/// Returns `None` (after logging why) when the source yields nothing.
fn read_source(source: &KeySource) -> Option<Zeroizing<String>> {
    let raw = match source.kind {
        SourceKind::Env => {
            let name = source.name.as_deref()?;
            match std::env::var(name) {
                Ok(value) => Zeroizing::new(value),
                Err(_) => {
                    tracing::debug!(source = %source.describe(), "environment variable not set");
                    return None;
                }
            }
        }
        SourceKind::File => {
            let raw_path = source.path.as_deref()?;
            let path = match expand_path(raw_path) {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(source = %source.describe(), error = %e, "skipping key source");
                    return None;
                }
            };
            match fs::read_to_string(&path) {
                Ok(contents) => Zeroizing::new(contents),
                Err(e) => {
                    tracing::warn!(
                        source = %source.describe(),
                        error = %e,
                        "skipping unreadable key source"
                    );
                    return None;
                }
            }
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::debug!(source = %source.describe(), "key source is empty");
        return None;
    }
    Some(Zeroizing::new(trimmed.to_string()))
}

fn describe_all(sources: &[KeySource]) -> String {
    sources
        .iter()
        .map(KeySource::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves symmetric keys from an ordered list of sources.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    sources: Vec<KeySource>,
}

impl KeyResolver {
    /// With no sources, falls back to the `VAULT_KEY` environment variable.
    pub fn new(sources: &[KeySource]) -> Self {
        let sources = if sources.is_empty() {
            vec![KeySource::env(DEFAULT_VAULT_KEY_ENV)]
        } else {
            sources.to_vec()
        };
        Self { sources }
    }

    pub fn sources(&self) -> &[KeySource] {
        &self.sources
    }

    /// Every key the sources currently yield, in source order.
    pub fn resolve_keys(&self) -> Result<Vec<EncryptionKey>> {
        let keys: Vec<EncryptionKey> = self
            .sources
            .iter()
            .filter_map(|source| {
                let text = read_source(source)?;
                tracing::debug!(source = %source.describe(), "resolved key");
                Some(EncryptionKey::new(text.as_str()))
            })
            .collect();

        if keys.is_empty() {
            return Err(VaultError::NoAccess(format!(
                "no encryption key found in sources [{}]",
                describe_all(&self.sources)
            )));
        }
        Ok(keys)
    }
}

/// Try each key in order and return the plaintext with the key that
/// decrypted it.
///
/// Sound only because the cipher is authenticated: a wrong key fails the
/// tag check instead of producing garbage.
pub fn try_decrypt(
    keys: &[EncryptionKey],
    ciphertext: &str,
) -> Result<(Zeroizing<Vec<u8>>, EncryptionKey)> {
    for (idx, key) in keys.iter().enumerate() {
        match decrypt_value(key.as_str(), ciphertext) {
            Ok(plaintext) => {
                tracing::debug!(candidate = idx, "vault decrypted");
                return Ok((plaintext, key.clone()));
            }
            Err(e) => tracing::debug!(candidate = idx, error = %e, "key did not decrypt vault"),
        }
    }
    Err(VaultError::DecryptionFailed(format!(
        "none of the {} resolved keys decrypted the vault",
        keys.len()
    )))
}

/// Resolves age identities from an ordered list of sources.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    sources: Vec<KeySource>,
}

impl IdentityResolver {
    /// With no sources, falls back to the `VAULT_KEY` environment variable.
    pub fn new(sources: &[KeySource]) -> Self {
        let sources = if sources.is_empty() {
            vec![KeySource::env(DEFAULT_VAULT_KEY_ENV)]
        } else {
            sources.to_vec()
        };
        Self { sources }
    }

    pub fn sources(&self) -> &[KeySource] {
        &self.sources
    }

    /// Every identity the sources yield.
    ///
    /// A source may hold several identities, one per line; blank lines
    /// and `#` comments are ignored and unparseable lines are skipped.
    pub fn resolve_identities(&self) -> Result<Vec<age::x25519::Identity>> {
        let mut identities = Vec::new();

        for source in &self.sources {
            let Some(text) = read_source(source) else {
                continue;
            };
            let before = identities.len();
            identities.extend(parse_identities(&text, source));
            if identities.len() == before {
                tracing::warn!(source = %source.describe(), "no valid age identity in source");
            } else {
                tracing::debug!(
                    source = %source.describe(),
                    count = identities.len() - before,
                    "resolved identities"
                );
            }
        }

        if identities.is_empty() {
            return Err(VaultError::NoAccess(format!(
                "no age identity found in sources [{}]",
                describe_all(&self.sources)
            )));
        }
        Ok(identities)
    }
}

fn parse_identities(text: &str, source: &KeySource) -> Vec<age::x25519::Identity> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.parse::<age::x25519::Identity>() {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(
                    source = %source.describe(),
                    error = %e,
                    "skipping unparseable identity line"
                );
                None
            }
        })
        .collect()
}
