//! Core data types for Herald.
//!
//! Platform-neutral identifiers, guild configuration, notifications, room
//! snapshots and alert payloads shared by every Herald crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod activity;
mod alert;
mod config;
mod event;
mod ids;
mod permissions;
mod room;

pub use activity::{ActivityLogEntry, ActivityRange};
pub use alert::{AlertKind, AlertPayload};
pub use config::{GuildAlertConfig, SettingToggle};
pub use event::{OccupancyChange, OnlineStatus, PresenceChange};
pub use ids::{ChannelId, GuildId, MessageId, RoleId, UserId};
pub use permissions::{OverwriteTarget, PermissionOverwrite, Permissions};
pub use room::{MemberRef, TextChannelRef, ThreadHandle, ThreadState, VoiceRoom};
