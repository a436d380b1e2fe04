//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  `derive_key` always uses the fixed default cost
//! so a `(password, salt)` pair re-derives the same key on every host.
//! The default is the RFC 9106 low-memory profile (64 MiB, t=3, p=4).

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use super::encoding::{decode, encode};
use super::keys::EncryptionKey;
use crate::errors::{Result, VaultError};

/// Length of a generated salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Derive an encryption key from a password.
///
/// When `salt` is `None` a fresh random 32-byte salt is generated.  The
/// returned salt is base64 text and must be kept to re-derive the key.
pub fn derive_key(password: &[u8], salt: Option<&[u8]>) -> Result<(EncryptionKey, String)> {
    derive_key_with_params(password, salt, &Argon2Params::default())
}

/// Derive an encryption key with explicit Argon2id parameters.
///
/// The same password + salt + params will always produce the same key.
/// Enforces minimum Argon2 parameters to prevent dangerously weak KDF settings.
pub fn derive_key_with_params(
    password: &[u8],
    salt: Option<&[u8]>,
    argon2_params: &Argon2Params,
) -> Result<(EncryptionKey, String)> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let salt = match salt {
        Some(s) => s.to_vec(),
        None => generate_salt().to_vec(),
    };

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, &salt, &mut key[..])
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok((EncryptionKey::from_bytes(&key[..]), encode(&salt)))
}

/// Derive a key from a password and a base64-encoded salt.
///
/// Convenience for callers that stored the salt returned by `derive_key`.
pub fn rederive_key(password: &[u8], encoded_salt: &str) -> Result<EncryptionKey> {
    let salt = decode(encoded_salt)?;
    derive_key(password, Some(&salt)).map(|(key, _)| key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
