//! Redis Streams broker.
//!
//! One stream per ready queue. Publishing is `XADD` under a bounded deadline;
//! consumption is a consumer-group pull loop (`XREADGROUP`, one entry at a
//! time) that acknowledges each entry after the handler returns, success or
//! not — at-least-once, no deduplication.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use fred::clients::Client;
use fred::error::Error as RedisError;
use fred::interfaces::{ClientLike, StreamsInterface};
use fred::types::config::Config as RedisConfig;
use fred::types::streams::{XReadResponse, XID};
use notifyd_common::config;
use notifyd_common::{AppError, AppResult};
use tracing::{debug, error, info, warn};

/// One entry read from a ready queue.
#[derive(Debug, Clone)]
pub struct BrokerMessage {
    /// Stream entry id.
    pub id: String,
    /// Partition-affinity key (`user:<id>`), when the producer set one.
    pub key: Option<String>,
    /// Decimal notification id.
    pub value: String,
}

/// Consumer loop tuning.
#[derive(Debug, Clone)]
pub struct ConsumeOptions {
    /// How long a blocking read waits for a message.
    pub block_ms: u64,
    /// Delay before retrying after a failed read.
    pub read_retry: Duration,
}

impl Default for ConsumeOptions {
    fn default() -> Self {
        Self {
            block_ms: 5000,
            read_retry: Duration::from_secs(2),
        }
    }
}

/// Redis Streams publisher/consumer.
#[derive(Clone)]
pub struct RedisBroker {
    client: Client,
    publish_timeout: Duration,
}

impl RedisBroker {
    /// Connect to Redis.
    pub async fn connect(config: &config::RedisConfig) -> AppResult<Self> {
        let redis_config = RedisConfig::from_url(&config.url)
            .map_err(|e| AppError::Broker(format!("Invalid Redis URL: {e}")))?;

        let client = Client::new(redis_config, None, None, None);
        client
            .init()
            .await
            .map_err(|e| AppError::Broker(format!("Failed to connect to Redis: {e}")))?;

        info!("Redis broker connected");

        Ok(Self {
            client,
            publish_timeout: Duration::from_secs(config.publish_timeout_secs),
        })
    }

    /// Publish one message to a queue, bounded by the publish deadline.
    pub async fn publish(&self, queue: &str, key: &str, value: &str) -> AppResult<()> {
        let fields = vec![("key", key.to_string()), ("value", value.to_string())];
        let publish = self
            .client
            .xadd::<String, _, _, _, _>(queue, false, None::<()>, XID::Auto, fields);

        let entry_id = tokio::time::timeout(self.publish_timeout, publish)
            .await
            .map_err(|_| AppError::Broker(format!("Publish to {queue} timed out")))?
            .map_err(|e| AppError::Broker(format!("Publish to {queue} failed: {e}")))?;

        debug!(queue, entry_id, "Published message");
        Ok(())
    }

    /// Consume a queue through a consumer group, one message at a time.
    ///
    /// The group is created if missing. Each entry is passed to `handler` and
    /// acknowledged afterwards regardless of the handler's outcome; a failed
    /// read sleeps `read_retry` and retries. Runs until the task is aborted.
    pub async fn consume<F, Fut>(
        &self,
        queue: &str,
        group: &str,
        options: &ConsumeOptions,
        handler: F,
    ) -> AppResult<()>
    where
        F: Fn(BrokerMessage) -> Fut + Send + Sync,
        Fut: Future<Output = AppResult<()>> + Send,
    {
        self.ensure_group(queue, group).await?;

        // Unique per process so parallel workers in one group do not collide.
        let consumer = format!("{group}-{}", uuid::Uuid::new_v4());
        info!(queue, group, consumer, "Consumer loop started");

        loop {
            let reply: Result<XReadResponse<String, String, String, String>, RedisError> = self
                .client
                .xreadgroup_map(
                    group,
                    consumer.as_str(),
                    Some(1),
                    Some(options.block_ms),
                    false,
                    queue,
                    XID::NewInGroup,
                )
                .await;

            let entries = match reply {
                Ok(mut streams) => streams.remove(queue).unwrap_or_default(),
                Err(e) => {
                    warn!(queue, error = %e, "Stream read failed, retrying");
                    tokio::time::sleep(options.read_retry).await;
                    continue;
                }
            };

            for (entry_id, mut fields) in entries {
                let message = BrokerMessage {
                    id: entry_id.clone(),
                    key: fields.remove("key"),
                    value: fields.remove("value").unwrap_or_default(),
                };

                if let Err(e) = handler(message).await {
                    error!(queue, entry_id, error = %e, "Handler error");
                }

                // Ack regardless of the handler outcome: at-least-once with
                // no redelivery from this core.
                if let Err(e) = self.client.xack::<u64, _, _, _>(queue, group, &entry_id).await {
                    warn!(queue, entry_id, error = %e, "Failed to ack entry");
                }
            }
        }
    }

    /// Create the consumer group if it does not exist yet.
    async fn ensure_group(&self, queue: &str, group: &str) -> AppResult<()> {
        let result: Result<(), RedisError> = self
            .client
            .xgroup_create(queue, group, XID::Manual("0".into()), true)
            .await;

        match result {
            Ok(()) => {
                info!(queue, group, "Created consumer group");
                Ok(())
            }
            // Another consumer already created the group.
            Err(e) if e.details().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(AppError::Broker(format!(
                "Failed to create group {group} on {queue}: {e}"
            ))),
        }
    }
}

#[async_trait]
impl notifyd_core::ReadyQueuePublisher for RedisBroker {
    async fn publish(&self, queue: &str, key: &str, value: &str) -> AppResult<()> {
        Self::publish(self, queue, key, value).await
    }
}
