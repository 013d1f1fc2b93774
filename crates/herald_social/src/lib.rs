//! Platform adapters for Herald.
//!
//! With the `discord` feature (on by default) this crate provides:
//!
//! - [`DiscordPlatform`], the serenity-backed [`herald_interface::AlertPlatform`]
//! - [`HeraldHandler`], which turns gateway events into engine notifications
//! - [`HeraldBot`], the gateway client wiring both to an
//!   [`herald_relay::AlertEngine`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "discord")]
mod discord;

#[cfg(feature = "discord")]
pub use discord::{
    DiscordPlatform, HeraldBot, HeraldHandler, PresenceTracker, kind_for_response,
    online_status, platform_error,
};
