//! `coffer init`: write a vault config and create the vault.

use crate::cli::output;
use crate::cli::{Cli, InitArgs};
use crate::config::{Config, ProviderType};
use crate::errors::{Result, VaultError};
use crate::vault;

/// Execute the `init` command.
pub fn execute(cli: &Cli, args: &InitArgs) -> Result<()> {
    if cli.config.exists() && !args.force {
        output::tip("Pass --force to overwrite it.");
        return Err(VaultError::CommandFailed(format!(
            "config file {} already exists",
            cli.config.display()
        )));
    }

    let config = build_config(args)?;
    config.validate()?;
    config.save(&cli.config)?;
    output::info(&format!("Wrote config to {}", cli.config.display()));

    // Opening once creates the vault file.
    let vault = vault::open(&config)?;
    vault.close()?;

    output::success(&format!("Vault '{}' ({}) is ready", config.id, config.provider));
    if config.provider == ProviderType::Aes256
        && config.aes.as_ref().is_some_and(|a| a.key_sources.is_empty())
    {
        output::tip("No key source given; the key is read from $VAULT_KEY.");
    }
    output::tip("Add a secret: coffer set <KEY>");
    Ok(())
}

/// Turn the command-line flags into a vault config.
pub fn build_config(args: &InitArgs) -> Result<Config> {
    let provider: ProviderType = args.provider.parse()?;
    let mut config = Config::new(args.id.clone(), provider).with_storage_path(args.path.clone());

    match provider {
        ProviderType::Aes256 => {
            if let Some(name) = &args.key_env {
                config = config.with_key_from_env(name.clone());
            }
            if let Some(path) = &args.key_file {
                config = config.with_key_from_file(path.clone());
            }
        }
        ProviderType::Age => {
            if let Some(name) = &args.identity_env {
                config = config.with_identity_from_env(name.clone());
            }
            if let Some(path) = &args.identity_file {
                config = config.with_identity_from_file(path.clone());
            }
            config = config.with_recipients(args.recipients.iter().cloned());
        }
        ProviderType::Unencrypted => {}
        ProviderType::Keyring => {
            config = config.with_keyring_service(
                args.service.clone().unwrap_or_else(|| "coffer".to_string()),
            );
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(provider: &str) -> InitArgs {
        InitArgs {
            id: "team".into(),
            provider: provider.into(),
            path: "/tmp/coffer".into(),
            key_env: Some("TEAM_KEY".into()),
            key_file: None,
            identity_env: None,
            identity_file: Some("/tmp/age.txt".into()),
            recipients: vec!["age1xyz".into()],
            service: None,
            force: false,
        }
    }

    #[test]
    fn aes_flags_become_key_sources() {
        let config = build_config(&args("aes256")).unwrap();
        let aes = config.aes.unwrap();
        assert_eq!(aes.storage_path, "/tmp/coffer");
        assert_eq!(aes.key_sources.len(), 1);
        assert!(config.age.is_none());
    }

    #[test]
    fn age_flags_become_identity_sources_and_recipients() {
        let config = build_config(&args("age")).unwrap();
        let age = config.age.unwrap();
        assert_eq!(age.identity_sources.len(), 1);
        assert_eq!(age.recipients, vec!["age1xyz"]);
        assert!(config.aes.is_none());
    }

    #[test]
    fn keyring_gets_default_service() {
        let config = build_config(&args("keyring")).unwrap();
        assert_eq!(config.keyring.unwrap().service, "coffer");
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(build_config(&args("external")).is_err());
    }
}
