//! PostgreSQL implementation of ActivityLog.

use crate::models::to_db;
use crate::schema::guild_activity_logs;
use crate::{ActivityLogRow, DatabaseResult, NewActivityLogRow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use herald_core::{ActivityLogEntry, GuildId, UserId};
use herald_error::{DatabaseError, StoreResult};
use herald_interface::ActivityLog;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Days an activity log entry is kept before [`PostgresActivityLog::purge_expired`] removes it.
pub const ACTIVITY_RETENTION_DAYS: i64 = 30;

/// Announced events in the `guild_activity_logs` table.
#[derive(Clone)]
pub struct PostgresActivityLog {
    conn: Arc<Mutex<PgConnection>>,
}

impl PostgresActivityLog {
    /// Create a log owning `conn`.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create a log from a shared connection.
    pub fn from_arc(conn: Arc<Mutex<PgConnection>>) -> Self {
        Self { conn }
    }

    /// Delete entries older than the retention period, returning how many went.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> DatabaseResult<usize> {
        let cutoff = Utc::now() - Duration::days(ACTIVITY_RETENTION_DAYS);
        let mut conn = self.conn.lock().await;
        let purged = diesel::delete(
            guild_activity_logs::table.filter(guild_activity_logs::occurred_at.lt(cutoff)),
        )
        .execute(&mut *conn)
        .map_err(DatabaseError::from)?;
        debug!(purged, "Purged expired activity");
        Ok(purged)
    }

    /// Most recent entries for a guild, newest first.
    pub async fn recent(
        &self,
        guild_id: GuildId,
        limit: i64,
    ) -> StoreResult<Vec<ActivityLogEntry>> {
        self.query(guild_id, None, None, limit).await
    }

    /// Entries for a guild, newest first, optionally limited to those at or
    /// after `since` and to a single actor.
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        guild_id: GuildId,
        since: Option<DateTime<Utc>>,
        actor_id: Option<UserId>,
        limit: i64,
    ) -> StoreResult<Vec<ActivityLogEntry>> {
        let mut query = guild_activity_logs::table
            .filter(guild_activity_logs::guild_id.eq(to_db(guild_id.get())))
            .select(ActivityLogRow::as_select())
            .into_boxed();
        if let Some(since) = since {
            query = query.filter(guild_activity_logs::occurred_at.ge(since));
        }
        if let Some(actor_id) = actor_id {
            query = query.filter(guild_activity_logs::actor_id.eq(to_db(actor_id.get())));
        }

        let rows: Vec<ActivityLogRow> = {
            let mut conn = self.conn.lock().await;
            query
                .order(guild_activity_logs::occurred_at.desc())
                .limit(limit)
                .load(&mut *conn)
                .map_err(|e| DatabaseError::from(e).into_store_error(guild_id.get()))?
        };
        debug!(count = rows.len(), "Activity entries loaded");
        rows.into_iter().map(ActivityLogEntry::try_from).collect()
    }
}

#[async_trait]
impl ActivityLog for PostgresActivityLog {
    #[instrument(skip(self, entry), fields(guild_id = %entry.guild_id(), kind = %entry.kind()))]
    async fn append(&self, entry: &ActivityLogEntry) -> StoreResult<()> {
        let row = NewActivityLogRow::from(entry);
        let mut conn = self.conn.lock().await;
        diesel::insert_into(guild_activity_logs::table)
            .values(&row)
            .execute(&mut *conn)
            .map_err(|e| DatabaseError::from(e).into_store_error(entry.guild_id().get()))?;
        Ok(())
    }
}
