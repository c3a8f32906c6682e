//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Scheduler loop configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Channel worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis broker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Per-call deadline for stream publishes, in seconds.
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
}

/// Scheduler loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between promotion cycles.
    #[serde(default = "default_scheduler_interval_secs")]
    pub interval_secs: u64,
    /// Maximum number of due rows promoted per cycle.
    #[serde(default = "default_scheduler_batch_size")]
    pub batch_size: u64,
    /// Backoff after a failed cycle, in seconds.
    #[serde(default = "default_scheduler_backoff_secs")]
    pub error_backoff_secs: u64,
}

/// Channel worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Channel key of the ready queue to consume (`email`, `sms`, `push`, `inapp`).
    #[serde(default = "default_worker_channel")]
    pub channel: String,
    /// Priority tier of the ready queue to consume (`high` or `low`).
    #[serde(default = "default_worker_priority")]
    pub priority: String,
    /// Consumer group name.
    #[serde(default = "default_worker_group")]
    pub group: String,
    /// How long a blocking read waits for a message, in milliseconds.
    #[serde(default = "default_worker_block_ms")]
    pub block_ms: u64,
    /// Delay before retrying after a failed read, in seconds.
    #[serde(default = "default_worker_read_retry_secs")]
    pub read_retry_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_scheduler_interval_secs(),
            batch_size: default_scheduler_batch_size(),
            error_backoff_secs: default_scheduler_backoff_secs(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            channel: default_worker_channel(),
            priority: default_worker_priority(),
            group: default_worker_group(),
            block_ms: default_worker_block_ms(),
            read_retry_secs: default_worker_read_retry_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_publish_timeout_secs() -> u64 {
    5
}

const fn default_scheduler_interval_secs() -> u64 {
    1
}

const fn default_scheduler_batch_size() -> u64 {
    100
}

const fn default_scheduler_backoff_secs() -> u64 {
    2
}

fn default_worker_channel() -> String {
    "inapp".to_string()
}

fn default_worker_priority() -> String {
    "low".to_string()
}

fn default_worker_group() -> String {
    "notifyd-workers".to_string()
}

const fn default_worker_block_ms() -> u64 {
    5000
}

const fn default_worker_read_retry_secs() -> u64 {
    2
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `NOTIFYD_ENV`)
    /// 3. Environment variables with `NOTIFYD_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("NOTIFYD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NOTIFYD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("NOTIFYD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
