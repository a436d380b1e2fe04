//! Cryptographic primitives for Coffer.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - Random key generation and the zeroizing `EncryptionKey` (`keys`)
//! - Base64 text encoding (`encoding`)

pub mod encoding;
pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt_value, decrypt_value, generate_key, ...};
pub use encoding::{decode, encode};
pub use encryption::{decrypt, decrypt_value, encrypt, encrypt_value};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, rederive_key, Argon2Params};
pub use keys::{generate_key, EncryptionKey};
