//! `coffer list`: display secret names in a table.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    let names = vault.list_secrets()?;
    vault.close()?;

    output::info(&format!("Vault '{}': {} secret(s)", vault.id(), names.len()));
    output::print_secrets_table(&names);
    Ok(())
}
