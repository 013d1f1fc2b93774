//! Configuration for the alert engine.
//!
//! Loaded from TOML with precedence (later sources override earlier):
//! 1. Bundled defaults (`herald.toml` shipped with the crate)
//! 2. `~/.config/herald/herald.toml`
//! 3. `./herald.toml`
//! 4. `HERALD_<SECTION>__<KEY>` environment variables

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use herald_cache::WriteBackConfig;
use herald_error::{ConfigError, HeraldResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Timing and limits for the alert engine.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct RelayConfig {
    /// Coalescing window for configuration writes (milliseconds)
    #[serde(default = "default_flush_window_ms")]
    flush_window_ms: u64,
    /// Idle time before a private-room thread is deleted (seconds)
    #[serde(default = "default_thread_inactivity_secs")]
    thread_inactivity_secs: u64,
    /// Delay before a sent alert is deleted (seconds)
    #[serde(default = "default_auto_delete_secs")]
    auto_delete_secs: u64,
    /// Maximum thread name length (characters)
    #[serde(default = "default_thread_name_limit")]
    thread_name_limit: usize,
    /// Concurrent add-member calls during membership sync
    #[serde(default = "default_member_sync_concurrency")]
    member_sync_concurrency: usize,
}

fn default_flush_window_ms() -> u64 {
    700
}

fn default_thread_inactivity_secs() -> u64 {
    600
}

fn default_auto_delete_secs() -> u64 {
    30
}

fn default_thread_name_limit() -> usize {
    100
}

fn default_member_sync_concurrency() -> usize {
    10
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            flush_window_ms: default_flush_window_ms(),
            thread_inactivity_secs: default_thread_inactivity_secs(),
            auto_delete_secs: default_auto_delete_secs(),
            thread_name_limit: default_thread_name_limit(),
            member_sync_concurrency: default_member_sync_concurrency(),
        }
    }
}

impl RelayConfig {
    /// Inactivity delay before thread eviction.
    pub fn thread_inactivity(&self) -> Duration {
        Duration::from_secs(self.thread_inactivity_secs)
    }

    /// Delay before a sent alert is deleted.
    pub fn auto_delete_after(&self) -> Duration {
        Duration::from_secs(self.auto_delete_secs)
    }

    /// Settings for the configuration cache.
    pub fn write_back(&self) -> WriteBackConfig {
        WriteBackConfig::default().with_flush_window_ms(self.flush_window_ms)
    }

    /// Reject combinations the engine cannot honour.
    ///
    /// Alerts must be deleted before the thread holding them is evicted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flush_window_ms == 0 {
            return Err(ConfigError::new("relay.flush_window_ms must be positive"));
        }
        if self.auto_delete_secs >= self.thread_inactivity_secs {
            return Err(ConfigError::new(format!(
                "relay.auto_delete_secs ({}) must be shorter than relay.thread_inactivity_secs ({})",
                self.auto_delete_secs, self.thread_inactivity_secs
            )));
        }
        if self.thread_name_limit == 0 {
            return Err(ConfigError::new("relay.thread_name_limit must be positive"));
        }
        if self.member_sync_concurrency == 0 {
            return Err(ConfigError::new(
                "relay.member_sync_concurrency must be positive",
            ));
        }
        Ok(())
    }
}

/// Log output settings, overridden by `RUST_LOG` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Top-level Herald configuration.
///
/// # Example
///
/// ```no_run
/// use herald_relay::HeraldConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HeraldConfig::load()?;
/// println!("threads idle out after {:?}", config.relay.thread_inactivity());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HeraldConfig {
    /// Engine timing and limits
    #[serde(default)]
    pub relay: RelayConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeraldConfig {
    /// Load configuration from a specific file, layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// result fails validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> HeraldResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.relay.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped when missing.
    #[instrument]
    pub fn load() -> HeraldResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/herald/herald.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("herald").required(false))
            .add_source(
                Environment::with_prefix("HERALD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.relay.validate()?;
        Ok(config)
    }
}

const DEFAULT_CONFIG: &str = include_str!("../../../herald.toml");
