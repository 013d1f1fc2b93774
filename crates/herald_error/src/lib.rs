//! Error types for Herald.
//!
//! This crate provides the error types shared by every Herald crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use herald_error::{HeraldResult, StoreError, StoreErrorKind};
//!
//! fn load() -> HeraldResult<()> {
//!     Err(StoreError::new(StoreErrorKind::Unavailable("connection reset".into())))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod platform;
mod relay;
mod store;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{HeraldError, HeraldErrorKind, HeraldResult};
pub use platform::{PlatformError, PlatformErrorKind, PlatformResult};
pub use relay::{RelayError, RelayErrorKind, RelayResult};
pub use store::{StoreError, StoreErrorKind, StoreResult};
