//! Alert payloads.

use serde::{Deserialize, Serialize};

/// Kind of alert, also the activity log `type` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Member joined a voice room
    Join,
    /// Member left a voice room
    Leave,
    /// Member came online
    Online,
}

impl AlertKind {
    /// Embed colour for this kind.
    pub const fn color(self) -> u32 {
        match self {
            AlertKind::Join => 0x00FFCC,
            AlertKind::Leave => 0xFF5E5E,
            AlertKind::Online => 0x55FF55,
        }
    }
}

/// A rendered alert, ready for the platform to send.
///
/// # Examples
///
/// ```
/// use herald_core::{AlertKind, AlertPayload};
///
/// let alert = AlertPayload::join("ada", "Lounge");
/// assert_eq!(alert.kind, AlertKind::Join);
/// assert!(alert.description.contains("**Lounge**"));
/// assert_eq!(alert.color, 0x00FFCC);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Alert kind
    pub kind: AlertKind,
    /// Heading line
    pub title: String,
    /// Body text
    pub description: String,
    /// Embed colour
    pub color: u32,
    /// Footer text
    pub footer: String,
}

impl AlertPayload {
    /// Member joined `room`.
    pub fn join(member: &str, room: &str) -> Self {
        Self {
            kind: AlertKind::Join,
            title: format!("{member} just popped in! 🔊"),
            description: format!("🎧 **{member}** joined **{room}**. Let the vibes begin!"),
            color: AlertKind::Join.color(),
            footer: "🎉 Welcome to the voice party!".to_string(),
        }
    }

    /// Member left `room`.
    pub fn leave(member: &str, room: &str) -> Self {
        Self {
            kind: AlertKind::Leave,
            title: format!("{member} dipped out! 🏃"),
            description: format!("👋 **{member}** left **{room}**. See ya next time!"),
            color: AlertKind::Leave.color(),
            footer: "💨 Gone but not forgotten.".to_string(),
        }
    }

    /// Member came online.
    pub fn online(member: &str) -> Self {
        Self {
            kind: AlertKind::Online,
            title: format!("{member} just came online! 🟢"),
            description: format!("👀 **{member}** is now online. Something's cooking!"),
            color: AlertKind::Online.color(),
            footer: "✨ Ready to vibe!".to_string(),
        }
    }
}
