//! Collaborator traits for Herald.
//!
//! The alert engine talks to storage and to the chat platform only through
//! these traits, so tests can drive it with in-memory fakes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ActivityLog, AlertPlatform, ConfigStore};
