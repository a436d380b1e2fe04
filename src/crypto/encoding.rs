//! Standard base64 text encoding for keys, salts and ciphertext.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{Result, VaultError};

/// Encode raw bytes as standard (padded) base64.
pub fn encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode standard base64 text back into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text.trim())
        .map_err(|e| VaultError::EncodingError(format!("invalid base64: {e}")))
}
