//! The in-memory secret value handed to and returned from providers.
//!
//! The plaintext lives in a single owned buffer that is wiped by `zero`
//! and again on drop.  `Display` and `Debug` only ever show the mask, so
//! a secret that ends up in a log line or an error message stays hidden.

use std::fmt;

use rand::RngCore;
use zeroize::Zeroize;

/// Placeholder shown instead of a secret's content.
pub const MASK: &str = "********";

/// An opaque secret value.
pub struct SecretValue {
    value: Vec<u8>,
}

impl SecretValue {
    /// Wrap raw bytes.  The bytes are moved in, not copied.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The value decoded as UTF-8 (invalid sequences are replaced).
    pub fn plaintext(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }

    /// The value as a string slice, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// The fixed mask; never derived from the content.
    pub fn masked(&self) -> &'static str {
        MASK
    }

    /// A copy of the raw bytes.  Mutating it does not affect the secret.
    pub fn bytes(&self) -> Vec<u8> {
        self.value.clone()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Wipe the backing buffer.
    ///
    /// Overwrites with random bytes, then zeroes, truncates and releases
    /// the allocation.  Safe to call more than once.  This is best effort:
    /// copies made by the caller or the allocator are out of reach.
    pub fn zero(&mut self) {
        if self.value.is_empty() {
            return;
        }
        rand::rng().fill_bytes(&mut self.value);
        self.value.zeroize();
        self.value.shrink_to_fit();
    }
}

impl Drop for SecretValue {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<Vec<u8>> for SecretValue {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue({MASK})")
    }
}
