//! storectl - entry point
//!
//! CLI-based entry point that dispatches to the store commands.

mod args;
mod commands;

use clap::Parser;

use args::{Cli, Commands};
use commands::Backend;
use common::{telemetry, AppResult, DatabaseConfig};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    telemetry::init(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(code = e.code(), "Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let backend = if cli.in_memory {
        tracing::info!("Using the in-memory store");
        Backend::in_memory()
    } else {
        let config = load_config(cli.database_url)?;
        tracing::debug!(?config, "Configuration loaded");
        Backend::connect(&config).await?
    };

    match cli.command {
        Commands::Init => commands::init::execute(&backend).await,
        Commands::Get(args) => commands::records::execute_get(args, &backend).await,
        Commands::Delete(args) => commands::records::execute_delete(args, &backend).await,
        Commands::Demo => commands::demo::execute(&backend).await,
    }
}

fn load_config(database_url: Option<String>) -> AppResult<DatabaseConfig> {
    resolve_config(DatabaseConfig::from_env()?, database_url)
}

/// Apply the command-line URL, then validate the result once
fn resolve_config(
    config: DatabaseConfig,
    database_url: Option<String>,
) -> AppResult<DatabaseConfig> {
    let config = match database_url {
        Some(url) => config.with_url(url),
        None => config,
    };
    config.validate()?;
    Ok(config)
}
