//! Symmetric key material.
//!
//! Keys travel through the crate in their base64 text form, the same
//! form users put in environment variables and key files.

use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use super::encoding::{decode, encode};
use super::encryption::KEY_LEN;
use crate::errors::{Result, VaultError};

/// A base64-encoded 256-bit key that zeroes its memory when dropped.
///
/// `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct EncryptionKey {
    encoded: String,
}

impl EncryptionKey {
    /// Wrap an already-encoded key (e.g. read from an env var or file).
    ///
    /// No validation happens here; malformed material is detected when
    /// the key is first used to encrypt or decrypt.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self {
            encoded: encoded.into(),
        }
    }

    /// Encode raw key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            encoded: encode(bytes),
        }
    }

    /// The base64 text of the key.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Decode and check that the key is exactly 256 bits.
    pub fn decode(&self) -> Result<Zeroizing<Vec<u8>>> {
        let bytes = decode(&self.encoded)
            .map(Zeroizing::new)
            .map_err(|_| VaultError::InvalidKey("key is not valid base64".into()))?;
        if bytes.len() != KEY_LEN {
            return Err(VaultError::InvalidKey(format!(
                "key must decode to {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(********)")
    }
}

/// Generate a fresh random 256-bit key.
pub fn generate_key() -> EncryptionKey {
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    rand::rng().fill_bytes(&mut bytes[..]);
    EncryptionKey::from_bytes(&bytes[..])
}
