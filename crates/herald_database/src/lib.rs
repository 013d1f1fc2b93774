//! PostgreSQL persistence for Herald.
//!
//! Implements [`herald_interface::ConfigStore`] and
//! [`herald_interface::ActivityLog`] over Diesel.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_database::{establish_connection, run_migrations, PostgresConfigStore};
//!
//! let mut conn = establish_connection()?;
//! run_migrations(&mut conn)?;
//! let store = PostgresConfigStore::new(conn);
//! ```

#![forbid(unsafe_code)]

mod activity_log;
mod config_store;
mod connection;
mod models;

pub mod schema;

pub use activity_log::{ACTIVITY_RETENTION_DAYS, PostgresActivityLog};
pub use config_store::PostgresConfigStore;
pub use connection::{establish_connection, establish_connection_to, run_migrations};
pub use models::{ActivityLogRow, GuildSettingsRow, NewActivityLogRow};

use herald_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
