//! PostgreSQL implementation of ConfigStore.

use crate::GuildSettingsRow;
use crate::models::to_db;
use crate::schema::guild_alert_settings;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use herald_core::{GuildAlertConfig, GuildId};
use herald_error::{DatabaseError, StoreResult};
use herald_interface::ConfigStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Guild settings in the `guild_alert_settings` table, one row per guild.
///
/// The connection is shared behind an async mutex; every call holds it for
/// one short statement.
#[derive(Clone)]
pub struct PostgresConfigStore {
    conn: Arc<Mutex<PgConnection>>,
}

impl PostgresConfigStore {
    /// Create a store owning `conn`.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create a store from a shared connection.
    pub fn from_arc(conn: Arc<Mutex<PgConnection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ConfigStore for PostgresConfigStore {
    #[instrument(skip(self))]
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildAlertConfig>> {
        let mut conn = self.conn.lock().await;
        guild_alert_settings::table
            .find(to_db(guild_id.get()))
            .select(GuildSettingsRow::as_select())
            .first(&mut *conn)
            .optional()
            .map(|row| row.map(GuildAlertConfig::from))
            .map_err(|e| DatabaseError::from(e).into_store_error(guild_id.get()))
    }

    #[instrument(skip(self, config), fields(guild_id = %config.guild_id))]
    async fn insert(&self, config: &GuildAlertConfig) -> StoreResult<()> {
        let row = GuildSettingsRow::from(config);
        let mut conn = self.conn.lock().await;
        diesel::insert_into(guild_alert_settings::table)
            .values(&row)
            .execute(&mut *conn)
            .map_err(|e| DatabaseError::from(e).into_store_error(config.guild_id.get()))?;
        debug!("Inserted guild settings");
        Ok(())
    }

    #[instrument(skip(self, config), fields(guild_id = %config.guild_id))]
    async fn upsert(&self, config: &GuildAlertConfig) -> StoreResult<()> {
        let row = GuildSettingsRow::from(config);
        let mut conn = self.conn.lock().await;
        diesel::insert_into(guild_alert_settings::table)
            .values(&row)
            .on_conflict(guild_alert_settings::guild_id)
            .do_update()
            .set(&row)
            .execute(&mut *conn)
            .map_err(|e| DatabaseError::from(e).into_store_error(config.guild_id.get()))?;
        debug!("Upserted guild settings");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: GuildId) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let deleted = diesel::delete(guild_alert_settings::table.find(to_db(guild_id.get())))
            .execute(&mut *conn)
            .map_err(|e| DatabaseError::from(e).into_store_error(guild_id.get()))?;
        debug!(deleted, "Deleted guild settings");
        Ok(())
    }
}
