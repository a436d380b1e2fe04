//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::errors::{Result, VaultError};
use crate::vault::{self, Provider};

/// Coffer CLI: local encrypted secret vaults.
#[derive(Parser)]
#[command(name = "coffer", about = "Local encrypted secret vaults", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault config file (JSON, or TOML with a .toml extension)
    #[arg(short, long, env = "COFFER_CONFIG", default_value = "coffer.json", global = true)]
    pub config: PathBuf,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Write a vault config and create the vault
    Init(InitArgs),

    /// Print a secret's value
    Get {
        /// Secret name
        key: String,
    },

    /// Set a secret (add or update)
    Set {
        /// Secret name (e.g. db.password)
        key: String,
        /// Secret value (omit for interactive prompt or piped input)
        value: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret name
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List secret names
    List,

    /// Show vault id, type and timestamps
    Info,

    /// Manage the recipients of an age vault
    Recipients {
        #[command(subcommand)]
        action: RecipientsAction,
    },

    /// Generate key material
    Keygen {
        #[arg(value_enum)]
        kind: KeyKind,
    },

    /// Derive a vault key from a password
    DeriveKey {
        /// Base64 salt from an earlier derivation (random if omitted)
        #[arg(long)]
        salt: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments of `coffer init`.
#[derive(clap::Args)]
pub struct InitArgs {
    /// Vault id (letters, digits, '-', '_', '.')
    #[arg(long)]
    pub id: String,

    /// Vault type: aes256, age, unencrypted or keyring
    #[arg(long = "type", default_value = "aes256")]
    pub provider: String,

    /// Directory for the vault file
    #[arg(long, default_value = ".coffer")]
    pub path: String,

    /// Environment variable holding the AES key
    #[arg(long)]
    pub key_env: Option<String>,

    /// File holding the AES key
    #[arg(long)]
    pub key_file: Option<String>,

    /// Environment variable holding an age identity
    #[arg(long)]
    pub identity_env: Option<String>,

    /// File holding age identities
    #[arg(long)]
    pub identity_file: Option<String>,

    /// Age recipient for a new vault (repeatable)
    #[arg(long = "recipient")]
    pub recipients: Vec<String>,

    /// Keyring service name
    #[arg(long)]
    pub service: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Recipient subcommands.
#[derive(clap::Subcommand)]
pub enum RecipientsAction {
    /// List recipients
    List,
    /// Add a recipient and re-encrypt
    Add {
        /// age public key (age1...)
        key: String,
    },
    /// Remove a recipient and re-encrypt
    Remove {
        /// age public key (age1...)
        key: String,
    },
}

/// Kinds of key material `keygen` can produce.
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum KeyKind {
    /// 256-bit AES key (base64)
    Aes,
    /// age X25519 identity and recipient
    Age,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load the config named by `--config`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    if !cli.config.exists() {
        return Err(VaultError::InvalidConfig(format!(
            "config file {} not found (run `coffer init` first)",
            cli.config.display()
        )));
    }
    Config::load(&cli.config)
}

/// Load the config and open its vault.
pub fn open_vault(cli: &Cli) -> Result<Box<dyn Provider>> {
    let config = load_config(cli)?;
    vault::open(&config)
}

/// Get a secret value, trying in order:
/// 1. the value given on the command line
/// 2. piped stdin
/// 3. an interactive hidden prompt
pub fn read_secret_value(key: &str, value: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        output::warning("Value provided on command line: it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }

    dialoguer::Password::new()
        .with_prompt(format!("Enter value for {key}"))
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))
}

/// Prompt for a password, or read it from `COFFER_PASSWORD` (scripted use).
pub fn prompt_password(confirm: bool) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("COFFER_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match, try again");
    }
    prompt
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))
}
