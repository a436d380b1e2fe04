//! `coffer keygen`: print fresh key material.

use crate::cli::output;
use crate::cli::KeyKind;
use crate::crypto::generate_key;
use crate::errors::Result;
use crate::vault::generate_age_identity;

/// Execute the `keygen` command.
pub fn execute(kind: KeyKind) -> Result<()> {
    match kind {
        KeyKind::Aes => {
            let key = generate_key();
            println!("{}", key.as_str());
            output::tip("Store it in $VAULT_KEY or a key file; a lost key cannot be recovered.");
        }
        KeyKind::Age => {
            let pair = generate_age_identity();
            println!("# public key: {}", pair.recipient);
            println!("{}", pair.identity.as_str());
            output::tip("Save both lines to an identity file and share only the public key.");
        }
    }
    Ok(())
}
