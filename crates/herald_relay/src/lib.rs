//! The Herald alert engine.
//!
//! Turns voice occupancy and presence notifications into alerts:
//!
//! - [`classify_occupancy`] / [`classify_presence`] decide whether an event
//!   is announced at all
//! - [`classify_room`] decides whether a voice room is private
//! - [`ThreadManager`] keeps one private thread per active private room,
//!   serialized per room through [`RoomLocks`]
//! - [`AlertDispatcher`] sends alerts and schedules their deletion
//! - [`AlertEngine`] wires these together over the collaborator traits
//! - [`SettingsService`] is the administrative mutation API

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod config;
mod dispatcher;
mod engine;
mod privacy;
mod room_lock;
mod settings;
mod threads;

pub use classifier::{OccupancyClass, PresenceClass, classify_occupancy, classify_presence};
pub use config::{HeraldConfig, LoggingConfig, RelayConfig, RelayConfigBuilder};
pub use dispatcher::AlertDispatcher;
pub use engine::AlertEngine;
pub use privacy::{RoomPrivacy, ViewerOverwrites, classify_room, everyone_view_permissions};
pub use room_lock::RoomLocks;
pub use settings::{SettingsChange, SettingsService};
pub use threads::{ThreadManager, thread_name};
