//! The `run` command: wire stores, engine and gateway client.

use diesel::pg::PgConnection;
use herald::{
    ConfigError, HeraldBot, HeraldConfig, HeraldResult, PostgresActivityLog, PostgresConfigStore,
    establish_connection, run_migrations, shutdown_signal,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How often expired activity entries are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Load configuration from `path`, or from the default locations.
pub fn load_config(path: Option<&Path>) -> HeraldResult<HeraldConfig> {
    match path {
        Some(path) => HeraldConfig::from_file(path),
        None => HeraldConfig::load(),
    }
}

/// Connect to `DATABASE_URL` and apply pending migrations.
pub fn connect_database() -> HeraldResult<Arc<Mutex<PgConnection>>> {
    let mut conn = establish_connection()?;
    let applied = run_migrations(&mut conn)?;
    info!(applied, "Database ready");
    Ok(Arc::new(Mutex::new(conn)))
}

/// Run the bot until a shutdown signal arrives.
pub async fn run_bot(config: &HeraldConfig) -> HeraldResult<()> {
    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| ConfigError::new("DISCORD_TOKEN environment variable not set"))?;

    let conn = connect_database()?;
    let store = Arc::new(PostgresConfigStore::from_arc(conn.clone()));
    let activity = Arc::new(PostgresActivityLog::from_arc(conn));
    let purger = spawn_purger(activity.clone());

    let bot = HeraldBot::new(&token, store, activity, &config.relay).await?;
    let result = bot.run(shutdown_signal()).await;
    purger.abort();

    result?;
    info!("Herald stopped");
    Ok(())
}

fn spawn_purger(activity: Arc<PostgresActivityLog>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match activity.purge_expired().await {
                Ok(purged) => debug!(purged, "Activity log purged"),
                Err(e) => warn!(error = %e, "Activity log purge failed"),
            }
        }
    })
}
