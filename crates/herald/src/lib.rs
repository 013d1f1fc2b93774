//! Herald: a Discord voice-presence alert relay.
//!
//! Watches voice-room occupancy and online status in each guild and posts
//! alerts to a configured text channel. Activity in private rooms goes to a
//! private thread visible only to the people allowed in the room.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`herald_core`]: identifiers, configuration and payload types
//! - [`herald_relay`]: the alert engine and settings service
//! - [`herald_cache`]: the write-back configuration cache
//! - [`herald_database`]: PostgreSQL stores
//! - [`herald_social`]: the Discord adapter
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::{HeraldBot, HeraldConfig, PostgresActivityLog, PostgresConfigStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HeraldConfig::load()?;
//!     let conn = herald::establish_connection()?;
//!     // ...build stores, then:
//!     let bot = HeraldBot::new(&token, store, activity, &config.relay).await?;
//!     bot.run(herald::shutdown_signal()).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observability;
mod shutdown;

pub use observability::{ObservabilityConfig, init_observability};
pub use shutdown::shutdown_signal;

pub use herald_cache::{WriteBackCache, WriteBackConfig};
pub use herald_core::*;
pub use herald_database::{
    ACTIVITY_RETENTION_DAYS, PostgresActivityLog, PostgresConfigStore, establish_connection,
    establish_connection_to, run_migrations,
};
pub use herald_error::*;
pub use herald_interface::{ActivityLog, AlertPlatform, ConfigStore};
pub use herald_relay::{
    AlertEngine, HeraldConfig, LoggingConfig, RelayConfig, SettingsChange, SettingsService,
};
pub use herald_social::{DiscordPlatform, HeraldBot, HeraldHandler};
