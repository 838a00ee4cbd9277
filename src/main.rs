use anyhow::Result;
use clap::Parser;

use simwatch::cli::{Cli, Commands, commands};
use simwatch::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            eprintln!("Using default configuration for now.");
            Settings::default()
        }),
    };

    simwatch::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Watch { root, debounce_ms } => {
            commands::watch::run(&settings, root, debounce_ms).await
        }
        Commands::List { root, json } => commands::list::run(&settings, root, json),
        Commands::Config => commands::config::run(&settings),
        Commands::Init { force } => commands::init::run(cli.config.as_deref(), force),
    }
}
