//! One module per `coffer` subcommand.

pub mod completions;
pub mod delete;
pub mod derive_key;
pub mod get;
pub mod info;
pub mod init;
pub mod keygen;
pub mod list;
pub mod recipients;
pub mod set;
