//! Discord integration for Herald.
//!
//! # Architecture
//!
//! - **platform**: REST calls behind [`herald_interface::AlertPlatform`]
//! - **handler**: serenity `EventHandler` feeding the alert engine
//! - **client**: gateway client setup and graceful shutdown
//! - **conversions**: serenity models to Herald core types
//! - **error**: serenity errors to [`herald_error::PlatformError`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use herald_social::HeraldBot;
//!
//! let bot = HeraldBot::new(&token, store, activity, &relay_config).await?;
//! bot.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```

mod client;
mod conversions;
mod error;
mod handler;
mod platform;

pub use client::HeraldBot;
pub use conversions::online_status;
pub use error::{kind_for_response, platform_error};
pub use handler::{HeraldHandler, PresenceTracker};
pub use platform::DiscordPlatform;
