//! Discord bot client setup and lifecycle management.
//!
//! [`HeraldBot`] owns the serenity client and the [`AlertEngine`] it feeds.

use super::{DiscordPlatform, HeraldHandler};
use herald_error::{PlatformError, PlatformErrorKind, PlatformResult};
use herald_interface::{ActivityLog, ConfigStore};
use herald_relay::{AlertEngine, RelayConfig};
use serenity::Client;
use serenity::http::Http;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument};

/// Main Discord client for Herald.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # async fn run(
/// #     store: Arc<dyn herald_interface::ConfigStore>,
/// #     log: Arc<dyn herald_interface::ActivityLog>,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// use herald_relay::RelayConfig;
/// use herald_social::HeraldBot;
///
/// let token = std::env::var("DISCORD_TOKEN")?;
/// let bot = HeraldBot::new(&token, store, log, &RelayConfig::default()).await?;
/// bot.run(async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub struct HeraldBot {
    client: Client,
    engine: AlertEngine,
}

impl std::fmt::Debug for HeraldBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeraldBot")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl HeraldBot {
    /// Build the engine over `store` and `activity` and connect a client to it.
    ///
    /// # Errors
    /// Returns an error if the serenity client fails to initialize.
    #[instrument(skip_all, fields(token_len = token.len()))]
    pub async fn new(
        token: &str,
        store: Arc<dyn ConfigStore>,
        activity: Arc<dyn ActivityLog>,
        relay: &RelayConfig,
    ) -> PlatformResult<Self> {
        info!("Initializing Herald Discord client");

        let platform = Arc::new(DiscordPlatform::new(Arc::new(Http::new(token))));
        let engine = AlertEngine::new(store, activity, platform.clone(), relay);
        let handler = HeraldHandler::new(engine.clone());
        let intents = HeraldHandler::intents();

        info!(?intents, "Building Serenity client");
        let client = Client::builder(token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                PlatformError::new(PlatformErrorKind::Api(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;
        platform.attach_cache(client.cache.clone());

        Ok(Self { client, engine })
    }

    /// The engine this client feeds.
    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    /// Run until `shutdown` resolves or the gateway connection fails.
    ///
    /// Either way the engine is shut down before returning, which flushes
    /// pending configuration writes.
    ///
    /// # Errors
    /// Returns an error if the client stops with a fatal gateway error.
    #[instrument(skip_all)]
    pub async fn run<F>(mut self, shutdown: F) -> PlatformResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shards = self.client.shard_manager.clone();
        let watcher = tokio::spawn(async move {
            shutdown.await;
            info!("Shutdown requested, closing gateway");
            shards.shutdown_all().await;
        });

        info!("Starting Discord client");
        let result = self.client.start().await;
        watcher.abort();
        self.engine.shutdown().await;

        result.map_err(|e| {
            PlatformError::new(PlatformErrorKind::Api(format!("Client error: {}", e)))
        })
    }
}
