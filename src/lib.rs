pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod paths;
pub mod vault;

#[cfg(feature = "keyring-store")]
pub mod keyring;

pub use config::Config;
pub use errors::{Result, VaultError};
pub use vault::{open, Provider, RecipientManager, SecretValue};
