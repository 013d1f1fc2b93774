//! CLI command definitions.

use clap::{Parser, Subcommand};
use herald::ActivityRange;
use std::path::PathBuf;

/// Herald - Discord voice-presence alert relay
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Discord voice-presence alert relay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to Discord and relay alerts until interrupted
    Run,

    /// Apply pending database migrations and exit
    Migrate,

    /// Print the effective configuration as JSON
    Config,

    /// Activity log maintenance
    #[command(subcommand)]
    Activity(ActivityCommands),
}

/// Activity log subcommands
#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// Show the most recent announced events for a guild
    Recent {
        /// Guild id
        guild: u64,

        /// Maximum number of entries to display
        #[arg(long, default_value = "20")]
        limit: i64,

        /// Only show entries in this window: today, yesterday, 7days or 30days
        #[arg(long)]
        range: Option<ActivityRange>,

        /// Only show entries for this user id
        #[arg(long)]
        user: Option<u64>,
    },

    /// Delete entries past the retention period
    Purge,
}
