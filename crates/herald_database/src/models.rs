//! Row types and conversions.

use crate::schema::{guild_activity_logs, guild_alert_settings};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use herald_core::{
    ActivityLogEntry, AlertKind, ChannelId, GuildAlertConfig, GuildId, RoleId, UserId,
};
use herald_error::{StoreError, StoreErrorKind};
use std::str::FromStr;

/// Snowflakes fit in 63 bits; the cast round-trips.
pub(crate) fn to_db(id: u64) -> i64 {
    id as i64
}

pub(crate) fn from_db(id: i64) -> u64 {
    id as u64
}

/// Database row for `guild_alert_settings`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = guild_alert_settings)]
#[diesel(primary_key(guild_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildSettingsRow {
    pub guild_id: i64,
    pub alerts_enabled: bool,
    pub text_channel_id: Option<i64>,
    pub join_alerts: bool,
    pub leave_alerts: bool,
    pub online_alerts: bool,
    pub private_thread_alerts: bool,
    pub auto_delete: bool,
    pub ignored_role_id: Option<i64>,
    pub ignore_role_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&GuildAlertConfig> for GuildSettingsRow {
    fn from(config: &GuildAlertConfig) -> Self {
        Self {
            guild_id: to_db(config.guild_id.get()),
            alerts_enabled: config.alerts_enabled,
            text_channel_id: config.text_channel_id.map(|id| to_db(id.get())),
            join_alerts: config.join_alerts,
            leave_alerts: config.leave_alerts,
            online_alerts: config.online_alerts,
            private_thread_alerts: config.private_thread_alerts,
            auto_delete: config.auto_delete,
            ignored_role_id: config.ignored_role_id.map(|id| to_db(id.get())),
            ignore_role_enabled: config.ignore_role_enabled,
            updated_at: Utc::now(),
        }
    }
}

impl From<GuildSettingsRow> for GuildAlertConfig {
    fn from(row: GuildSettingsRow) -> Self {
        Self {
            guild_id: GuildId::new(from_db(row.guild_id)),
            alerts_enabled: row.alerts_enabled,
            text_channel_id: row.text_channel_id.map(|id| ChannelId::new(from_db(id))),
            join_alerts: row.join_alerts,
            leave_alerts: row.leave_alerts,
            online_alerts: row.online_alerts,
            private_thread_alerts: row.private_thread_alerts,
            auto_delete: row.auto_delete,
            ignored_role_id: row.ignored_role_id.map(|id| RoleId::new(from_db(id))),
            ignore_role_enabled: row.ignore_role_enabled,
        }
    }
}

/// Database row for `guild_activity_logs`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = guild_activity_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityLogRow {
    pub id: i64,
    pub guild_id: i64,
    pub actor_id: i64,
    pub actor_tag: String,
    pub location: String,
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
}

impl TryFrom<ActivityLogRow> for ActivityLogEntry {
    type Error = StoreError;

    fn try_from(row: ActivityLogRow) -> Result<Self, Self::Error> {
        let kind = AlertKind::from_str(&row.kind).map_err(|_| {
            StoreError::new(StoreErrorKind::Corrupt(format!(
                "activity log {} has unknown kind {:?}",
                row.id, row.kind
            )))
        })?;
        Ok(ActivityLogEntry::at(
            GuildId::new(from_db(row.guild_id)),
            UserId::new(from_db(row.actor_id)),
            row.actor_tag,
            row.location,
            kind,
            row.occurred_at,
        ))
    }
}

/// Insertable struct for `guild_activity_logs`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guild_activity_logs)]
pub struct NewActivityLogRow {
    pub guild_id: i64,
    pub actor_id: i64,
    pub actor_tag: String,
    pub location: String,
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<&ActivityLogEntry> for NewActivityLogRow {
    fn from(entry: &ActivityLogEntry) -> Self {
        Self {
            guild_id: to_db(entry.guild_id().get()),
            actor_id: to_db(entry.actor_id().get()),
            actor_tag: entry.actor_tag().clone(),
            location: entry.location().clone(),
            kind: entry.kind().to_string(),
            occurred_at: *entry.occurred_at(),
        }
    }
}
