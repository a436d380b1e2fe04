//! `coffer set`: add or update a secret.

use crate::cli::output;
use crate::cli::{open_vault, read_secret_value, Cli};
use crate::errors::Result;
use crate::vault::SecretValue;

/// Execute the `set` command.
pub fn execute(cli: &Cli, key: &str, value: Option<&str>) -> Result<()> {
    let text = read_secret_value(key, value)?;
    let vault = open_vault(cli)?;

    let existed = vault.has_secret(key)?;
    vault.set_secret(key, SecretValue::from(text.as_str()))?;
    let total = vault.list_secrets()?.len();
    vault.close()?;

    let verb = if existed { "updated in" } else { "added to" };
    output::success(&format!(
        "Secret '{key}' {verb} vault '{}' ({total} total)",
        vault.id()
    ));
    Ok(())
}
