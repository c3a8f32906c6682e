//! Channel worker loop.
//!
//! One worker is bound to one ready queue. Each consumed message carries a
//! decimal notification id; the worker loads the row and runs it through the
//! delivery-attempt state machine.

use notifyd_common::AppResult;
use notifyd_core::routing::resolve_ready_queue_keys;
use notifyd_core::DeliveryService;
use notifyd_db::repositories::NotificationRepository;
use tracing::{info, warn};

use crate::broker::{ConsumeOptions, RedisBroker};

/// Per-message handler, separated from the consume loop for testability.
#[derive(Clone)]
pub struct MessageHandler {
    notification_repo: NotificationRepository,
    delivery: DeliveryService,
}

impl MessageHandler {
    /// Create a new message handler.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, delivery: DeliveryService) -> Self {
        Self {
            notification_repo,
            delivery,
        }
    }

    /// Handle one consumed message value.
    ///
    /// Malformed ids and ids without a row are logged and dropped; the entry
    /// is still acknowledged by the loop.
    pub async fn handle(&self, value: &str) -> AppResult<()> {
        let Ok(id) = value.parse::<i64>() else {
            warn!(value, "Ignoring message with non-numeric notification id");
            return Ok(());
        };

        let Some(notification) = self.notification_repo.find_by_id(id).await? else {
            warn!(notification_id = id, "Notification row not found, dropping");
            return Ok(());
        };

        self.delivery.process(&notification).await?;
        Ok(())
    }
}

/// A worker bound to one ready queue.
pub struct ChannelWorker {
    broker: RedisBroker,
    handler: MessageHandler,
    queue: String,
    group: String,
    options: ConsumeOptions,
}

impl ChannelWorker {
    /// Create a worker from the application worker configuration.
    ///
    /// The queue is resolved from the configured channel/priority keys; the
    /// consumer group name is suffixed with both so each queue gets its own
    /// group.
    #[must_use]
    pub fn from_config(
        broker: RedisBroker,
        handler: MessageHandler,
        config: &notifyd_common::config::WorkerConfig,
    ) -> Self {
        Self {
            broker,
            handler,
            queue: resolve_ready_queue_keys(&config.channel, &config.priority).to_string(),
            group: format!("{}-{}-{}", config.group, config.channel, config.priority),
            options: ConsumeOptions {
                block_ms: config.block_ms,
                read_retry: std::time::Duration::from_secs(config.read_retry_secs),
            },
        }
    }

    /// Run the consume loop indefinitely.
    pub async fn run(&self) -> AppResult<()> {
        info!(queue = %self.queue, group = %self.group, "Channel worker started");

        self.broker
            .consume(&self.queue, &self.group, &self.options, |message| {
                let handler = self.handler.clone();
                async move { handler.handle(&message.value).await }
            })
            .await
    }
}
