//! `coffer info`: show vault id, type and timestamps.

use crate::cli::output;
use crate::cli::{load_config, Cli};
use crate::errors::Result;
use crate::vault;

/// Execute the `info` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let vault = vault::open(&config)?;
    let metadata = vault.metadata()?;
    let count = vault.list_secrets()?.len();
    vault.close()?;

    output::print_vault_info(&config.id, config.provider.as_str(), count, &metadata);
    Ok(())
}
