//! Command-line interface module.
//!
//! CLI structure and command handlers for the herald binary.

mod activity;
mod commands;
mod run;

pub use activity::handle_activity_command;
pub use commands::{ActivityCommands, Cli, Commands};
pub use run::{connect_database, load_config, run_bot};
