use clap::Parser;
use coffer::cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_env("COFFER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(ref args) => commands::init::execute(&cli, args),
        Commands::Get { ref key } => commands::get::execute(&cli, key),
        Commands::Set { ref key, ref value } => commands::set::execute(&cli, key, value.as_deref()),
        Commands::Delete { ref key, force } => commands::delete::execute(&cli, key, force),
        Commands::List => commands::list::execute(&cli),
        Commands::Info => commands::info::execute(&cli),
        Commands::Recipients { ref action } => commands::recipients::execute(&cli, action),
        Commands::Keygen { kind } => commands::keygen::execute(kind),
        Commands::DeriveKey { ref salt } => commands::derive_key::execute(salt.as_deref()),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        coffer::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
