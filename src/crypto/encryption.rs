//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! The `*_value` variants work on base64 text: the key is the encoded
//! form returned by `generate_key`/`derive_key`, and the ciphertext is
//! the base64 encoding of the buffer above.  That is the exact content
//! of a symmetric vault file.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::encoding::{decode, encode};
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Largest plaintext accepted by `encrypt` (64 MiB).
pub const MAX_PLAINTEXT_LEN: usize = 64 * 1024 * 1024;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(VaultError::PlaintextTooLarge {
            size: plaintext.len(),
            limit: MAX_PLAINTEXT_LEN,
        });
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| {
        VaultError::InvalidKey(format!(
            "encryption key must be {KEY_LEN} bytes, got {}",
            key.len()
        ))
    })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    // Prepend the nonce so the caller only needs to store one blob.
    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Expects the first 12 bytes to be the nonce, followed by the ciphertext.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext_with_nonce.len() < NONCE_LEN {
        return Err(VaultError::DecryptionFailed(
            "ciphertext is shorter than the nonce".into(),
        ));
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| VaultError::DecryptionFailed("malformed key".into()))?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::DecryptionFailed("authentication failed".into()))?;

    Ok(Zeroizing::new(plaintext))
}

/// Encrypt `plaintext` with a base64-encoded key and return base64 text.
pub fn encrypt_value(encoded_key: &str, plaintext: &[u8]) -> Result<String> {
    let key = decode(encoded_key)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::InvalidKey("key is not valid base64".into()))?;
    let sealed = encrypt(&key, plaintext)?;
    Ok(encode(&sealed))
}

/// Decrypt base64 text produced by `encrypt_value`.
///
/// Malformed key material, malformed base64 and authentication failures
/// all surface as `DecryptionFailed`.
pub fn decrypt_value(encoded_key: &str, ciphertext: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = decode(encoded_key)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::DecryptionFailed("malformed key".into()))?;
    let sealed = decode(ciphertext)
        .map_err(|_| VaultError::DecryptionFailed("ciphertext is not valid base64".into()))?;
    decrypt(&key, &sealed)
}
