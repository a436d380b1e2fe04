//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Metadata;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a one-column table of secret names.
pub fn print_secrets_table(names: &[String]) {
    if names.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `coffer set <KEY>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name"]);
    for name in names {
        table.add_row(vec![name.clone()]);
    }
    println!("{table}");
}

/// Print recipients, numbered.
pub fn print_recipients_table(recipients: &[String]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Recipient"]);
    for (idx, recipient) in recipients.iter().enumerate() {
        table.add_row(vec![(idx + 1).to_string(), recipient.clone()]);
    }
    println!("{table}");
}

/// Print the vault summary shown by `coffer info`.
pub fn print_vault_info(id: &str, provider: &str, secrets: usize, metadata: &Metadata) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Vault".to_string(), id.to_string()]);
    table.add_row(vec!["Type".to_string(), provider.to_string()]);
    table.add_row(vec!["Secrets".to_string(), secrets.to_string()]);
    table.add_row(vec![
        "Created".to_string(),
        metadata.created.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]);
    table.add_row(vec![
        "Last modified".to_string(),
        metadata.last_modified.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]);
    println!("{table}");
}
