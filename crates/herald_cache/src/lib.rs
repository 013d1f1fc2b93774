//! Guild configuration caching with write-back persistence.
//!
//! Reads are served from memory; writes land in memory immediately and are
//! persisted in coalesced batches, one upsert per guild per flush window.

#![warn(missing_docs)]

mod cache;

pub use cache::{WriteBackCache, WriteBackConfig, WriteBackConfigBuilder};
