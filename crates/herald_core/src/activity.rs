//! Activity log records.

use crate::{AlertKind, GuildId, UserId};
use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One announced join, leave or online event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ActivityLogEntry {
    guild_id: GuildId,
    actor_id: UserId,
    actor_tag: String,
    /// Voice room name, or the destination channel name for online alerts
    location: String,
    kind: AlertKind,
    occurred_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Record an event that happened now.
    pub fn now(
        guild_id: GuildId,
        actor_id: UserId,
        actor_tag: impl Into<String>,
        location: impl Into<String>,
        kind: AlertKind,
    ) -> Self {
        Self::at(guild_id, actor_id, actor_tag, location, kind, Utc::now())
    }

    /// Record an event with an explicit timestamp.
    pub fn at(
        guild_id: GuildId,
        actor_id: UserId,
        actor_tag: impl Into<String>,
        location: impl Into<String>,
        kind: AlertKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            actor_id,
            actor_tag: actor_tag.into(),
            location: location.into(),
            kind,
            occurred_at,
        }
    }
}

/// Time window for activity queries, measured in UTC.
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
)]
pub enum ActivityRange {
    /// Since midnight today
    #[strum(serialize = "today")]
    #[serde(rename = "today")]
    Today,
    /// Since midnight yesterday
    #[strum(serialize = "yesterday")]
    #[serde(rename = "yesterday")]
    Yesterday,
    /// The last seven days
    #[strum(serialize = "7days")]
    #[serde(rename = "7days")]
    Week,
    /// The last thirty days
    #[strum(serialize = "30days")]
    #[serde(rename = "30days")]
    Month,
}

impl ActivityRange {
    /// Earliest timestamp inside the range, relative to `now`.
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        match self {
            Self::Today => midnight,
            Self::Yesterday => midnight
                .checked_sub_days(Days::new(1))
                .unwrap_or(midnight),
            Self::Week => now - TimeDelta::days(7),
            Self::Month => now - TimeDelta::days(30),
        }
    }
}
