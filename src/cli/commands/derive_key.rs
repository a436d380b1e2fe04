//! `coffer derive-key`: derive a vault key from a password.

use crate::cli::output;
use crate::cli::prompt_password;
use crate::crypto::{decode, derive_key};
use crate::errors::{Result, VaultError};

/// Execute the `derive-key` command.
///
/// Without `--salt` a random salt is generated and must be kept to
/// derive the same key again.
pub fn execute(salt: Option<&str>) -> Result<()> {
    let salt_bytes = salt
        .map(|s| {
            decode(s).map_err(|_| VaultError::CommandFailed("--salt must be base64".into()))
        })
        .transpose()?;

    let password = prompt_password(salt.is_none())?;
    let (key, salt) = derive_key(password.as_bytes(), salt_bytes.as_deref())?;

    println!("key:  {}", key.as_str());
    println!("salt: {salt}");
    output::tip("Keep the salt; the same password and salt give the same key.");
    Ok(())
}
