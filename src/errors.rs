use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Coffer.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Secret errors ---
    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // --- Access errors ---
    #[error("Access denied: {0}")]
    NoAccess(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault at {path} is corrupt: {reason}")]
    VaultCorrupt { path: PathBuf, reason: String },

    #[error("Vault '{0}' is closed")]
    VaultClosed(String),

    // --- Crypto errors ---
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Plaintext of {size} bytes exceeds the {limit} byte limit")]
    PlaintextTooLarge { size: usize, limit: usize },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Recipient errors ---
    #[error("Invalid recipient '{recipient}': {reason}")]
    InvalidRecipient { recipient: String, reason: String },

    #[error("Cannot remove '{0}': a vault needs at least one recipient")]
    LastRecipient(String),

    #[error("Recipient '{0}' not found")]
    RecipientNotFound(String),

    // --- Path errors ---
    #[error("Path is not secure ({path}): {reason}")]
    PathNotSecure { path: String, reason: String },

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for Coffer results.
pub type Result<T> = std::result::Result<T, VaultError>;
