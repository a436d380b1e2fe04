//! `coffer get`: print a single secret's value.

use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    let mut value = vault.get_secret(key)?;
    println!("{}", value.plaintext());
    value.zero();
    vault.close()
}
