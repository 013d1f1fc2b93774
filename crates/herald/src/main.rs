//! Herald binary.
//!
//! - `run`: relay voice and presence alerts until interrupted
//! - `migrate`: apply database migrations
//! - `config`: print the effective configuration
//! - `activity`: inspect or prune the activity log

use clap::Parser;
use herald::{ObservabilityConfig, init_observability};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, connect_database, handle_activity_command, load_config, run_bot};

    // Secrets may live in a local .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let mut observability = ObservabilityConfig::from_logging(&config.logging);
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability(&observability)?;

    match cli.command {
        Commands::Run => {
            run_bot(&config).await?;
        }

        Commands::Migrate => {
            connect_database()?;
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Activity(command) => {
            handle_activity_command(command).await?;
        }
    }

    Ok(())
}
