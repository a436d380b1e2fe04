//! `coffer recipients`: list, add or remove age vault recipients.

use crate::cli::output;
use crate::cli::{open_vault, Cli, RecipientsAction};
use crate::errors::{Result, VaultError};
use crate::vault::recipient_management;

/// Execute a `recipients` subcommand.
pub fn execute(cli: &Cli, action: &RecipientsAction) -> Result<()> {
    let vault = open_vault(cli)?;
    let manager = recipient_management(vault.as_ref()).ok_or_else(|| {
        VaultError::CommandFailed(format!(
            "vault '{}' does not support recipients (only age vaults do)",
            vault.id()
        ))
    })?;

    match action {
        RecipientsAction::List => {
            let recipients = manager.list_recipients()?;
            output::info(&format!(
                "Vault '{}': {} recipient(s)",
                vault.id(),
                recipients.len()
            ));
            output::print_recipients_table(&recipients);
        }
        RecipientsAction::Add { key } => {
            let before = manager.list_recipients()?.len();
            manager.add_recipient(key)?;
            if manager.list_recipients()?.len() == before {
                output::info("Recipient already present; nothing changed.");
            } else {
                output::success("Recipient added and vault re-encrypted");
            }
        }
        RecipientsAction::Remove { key } => {
            manager.remove_recipient(key)?;
            output::success("Recipient removed and vault re-encrypted");
            output::tip("Rotate secrets the removed recipient could read.");
        }
    }

    vault.close()
}
