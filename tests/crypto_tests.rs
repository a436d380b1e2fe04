//! Integration tests for the Coffer crypto module.

use coffer::crypto::{
    decode, decrypt, decrypt_value, derive_key, derive_key_with_params, encode, encrypt,
    encrypt_value, generate_key, rederive_key, Argon2Params,
};
use coffer::VaultError;

/// Cheap but valid Argon2id settings so the tests stay fast.
fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"DATABASE_URL=postgres://localhost/mydb";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // 12-byte nonce + 16-byte tag on top of the plaintext.
    assert_eq!(ciphertext.len(), plaintext.len() + 12 + 16);

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(&recovered[..], plaintext);
}

#[test]
fn text_roundtrip_covers_empty_unicode_and_large_values() {
    let key = generate_key();
    let large = "x".repeat(4096);
    for plaintext in ["", "héllo wörld 🔐", large.as_str()] {
        let ct = encrypt_value(key.as_str(), plaintext.as_bytes()).unwrap();
        let pt = decrypt_value(key.as_str(), &ct).unwrap();
        assert_eq!(&pt[..], plaintext.as_bytes());
    }
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = generate_key();
    let ct1 = encrypt_value(key.as_str(), b"SECRET=hello").unwrap();
    let ct2 = encrypt_value(key.as_str(), b"SECRET=hello").unwrap();

    // Each call draws a new nonce.
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
    assert_eq!(&decrypt_value(key.as_str(), &ct1).unwrap()[..], b"SECRET=hello");
    assert_eq!(&decrypt_value(key.as_str(), &ct2).unwrap()[..], b"SECRET=hello");
}

#[test]
fn wrong_key_fails_authentication() {
    let k1 = generate_key();
    let k2 = generate_key();
    let ct = encrypt_value(k1.as_str(), b"payload").unwrap();

    assert!(matches!(
        decrypt_value(k2.as_str(), &ct),
        Err(VaultError::DecryptionFailed(_))
    ));
}

#[test]
fn truncated_ciphertext_fails() {
    let key = [7u8; 32];
    assert!(matches!(
        decrypt(&key, &[0u8; 5]),
        Err(VaultError::DecryptionFailed(_))
    ));
}

#[test]
fn malformed_key_is_invalid_key() {
    assert!(matches!(
        encrypt(&[1u8; 10], b"data"),
        Err(VaultError::InvalidKey(_))
    ));
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn encoding_rejects_garbage() {
    assert_eq!(decode(&encode(b"\x00\xffabc")).unwrap(), b"\x00\xffabc");
    assert!(matches!(decode("@@not base64@@"), Err(VaultError::EncodingError(_))));
}

// ---------------------------------------------------------------------------
// Key generation and derivation
// ---------------------------------------------------------------------------

#[test]
fn generated_keys_are_unique_and_256_bits() {
    let a = generate_key();
    let b = generate_key();
    assert_ne!(a, b);
    assert_eq!(a.decode().unwrap().len(), 32);
}

#[test]
fn derivation_is_deterministic_for_same_salt() {
    let salt = [9u8; 32];
    let (k1, s1) = derive_key_with_params(b"correct horse", Some(&salt), &fast_params()).unwrap();
    let (k2, s2) = derive_key_with_params(b"correct horse", Some(&salt), &fast_params()).unwrap();
    assert_eq!(k1, k2);
    assert_eq!(s1, s2);

    let (k3, _) = derive_key_with_params(b"wrong horse", Some(&salt), &fast_params()).unwrap();
    assert_ne!(k1, k3);
}

#[test]
fn random_salt_is_returned_and_reusable() {
    let (k1, salt) = derive_key_with_params(b"pw", None, &fast_params()).unwrap();
    let raw_salt = decode(&salt).unwrap();
    assert_eq!(raw_salt.len(), 32);

    let (k2, _) = derive_key_with_params(b"pw", Some(&raw_salt), &fast_params()).unwrap();
    assert_eq!(k1, k2);

    let (k3, _) = derive_key_with_params(b"pw", None, &fast_params()).unwrap();
    assert_ne!(k1, k3, "fresh salts must give different keys");
}

#[test]
fn default_derivation_matches_rederive() {
    let (key, salt) = derive_key(b"passphrase", None).unwrap();
    assert_eq!(rederive_key(b"passphrase", &salt).unwrap(), key);
    assert_eq!(key.decode().unwrap().len(), 32);
}

#[test]
fn weak_kdf_params_are_rejected() {
    let weak = Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    assert!(matches!(
        derive_key_with_params(b"pw", None, &weak),
        Err(VaultError::KeyDerivationFailed(_))
    ));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(plaintext in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let key = generate_key();
            let ct = encrypt_value(key.as_str(), &plaintext).unwrap();
            let pt = decrypt_value(key.as_str(), &ct).unwrap();
            prop_assert_eq!(&pt[..], &plaintext[..]);
        }
    }
}
