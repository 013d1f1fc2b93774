//! The `activity` commands: inspect and prune the activity log.

use super::{ActivityCommands, connect_database};
use chrono::Utc;
use herald::{ACTIVITY_RETENTION_DAYS, GuildId, HeraldResult, PostgresActivityLog, UserId};

/// Execute an activity subcommand.
pub async fn handle_activity_command(command: ActivityCommands) -> HeraldResult<()> {
    let log = PostgresActivityLog::from_arc(connect_database()?);

    match command {
        ActivityCommands::Recent {
            guild,
            limit,
            range,
            user,
        } => {
            let since = range.map(|range| range.since(Utc::now()));
            let entries = log
                .query(GuildId::new(guild), since, user.map(UserId::new), limit)
                .await?;
            if entries.is_empty() {
                println!("No activity recorded for guild {}", guild);
            }
            for entry in entries {
                println!(
                    "{}  {:<6}  {:<24}  {}",
                    entry.occurred_at().format("%Y-%m-%d %H:%M:%S"),
                    entry.kind(),
                    entry.actor_tag(),
                    entry.location()
                );
            }
        }
        ActivityCommands::Purge => {
            let purged = log.purge_expired().await?;
            println!(
                "Removed {} entries older than {} days",
                purged, ACTIVITY_RETENTION_DAYS
            );
        }
    }

    Ok(())
}
