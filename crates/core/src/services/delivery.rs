//! Delivery-attempt state machine.
//!
//! Workers run every consumed message through [`DeliveryService::process`]:
//! a pending attempt row is written before the channel side effect executes,
//! then updated with the outcome, so the attempt history has no gaps.

use async_trait::async_trait;
use notifyd_common::AppResult;
use notifyd_db::entities::notification::{self, NotificationStatus};
use notifyd_db::repositories::{DeliveryAttemptRepository, NotificationRepository};
use std::sync::Arc;
use tracing::{error, info};

/// Trait for the channel-specific delivery side effect.
///
/// Returns the provider message id when the provider reports one. An error
/// marks the attempt (and the notification) as failed.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Deliver one notification.
    async fn deliver(&self, notification: &notification::Model) -> AppResult<Option<String>>;
}

/// Wrapper for boxed `ChannelTransport` trait object.
pub type TransportService = Arc<dyn ChannelTransport>;

/// Outcome of processing one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport confirmed delivery.
    Sent {
        /// Id of the recorded attempt.
        attempt_id: i64,
    },
    /// The transport reported failure; retries are driven externally.
    Failed {
        /// Id of the recorded attempt.
        attempt_id: i64,
        /// Machine-readable failure code.
        error_code: String,
    },
}

/// Service driving the `enqueued -> {sent, failed}` state machine.
#[derive(Clone)]
pub struct DeliveryService {
    notification_repo: NotificationRepository,
    attempt_repo: DeliveryAttemptRepository,
    transport: TransportService,
}

impl DeliveryService {
    /// Create a new delivery service.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        attempt_repo: DeliveryAttemptRepository,
        transport: TransportService,
    ) -> Self {
        Self {
            notification_repo,
            attempt_repo,
            transport,
        }
    }

    /// Process one notification through the transport.
    ///
    /// The pending attempt is written first; if that write itself fails, the
    /// error propagates to the caller, no side effect runs, and the
    /// notification stays `enqueued`.
    pub async fn process(&self, notification: &notification::Model) -> AppResult<DeliveryOutcome> {
        let attempt_no = self.attempt_repo.next_attempt_no(notification.id).await?;
        let attempt = self
            .attempt_repo
            .create_pending(notification.id, attempt_no)
            .await?;

        match self.transport.deliver(notification).await {
            Ok(provider_message_id) => {
                self.attempt_repo
                    .mark_success(attempt.id, provider_message_id.as_deref())
                    .await?;
                self.notification_repo
                    .update_status(notification.id, NotificationStatus::Sent)
                    .await?;

                info!(
                    notification_id = notification.id,
                    attempt_no, "Delivery succeeded"
                );
                Ok(DeliveryOutcome::Sent {
                    attempt_id: attempt.id,
                })
            }
            Err(e) => {
                let error_code = e.error_code().to_string();
                self.attempt_repo
                    .mark_failed(attempt.id, Some(&error_code), &e.to_string())
                    .await?;
                self.notification_repo
                    .update_status(notification.id, NotificationStatus::Failed)
                    .await?;

                error!(
                    notification_id = notification.id,
                    attempt_no,
                    error = %e,
                    "Delivery failed"
                );
                Ok(DeliveryOutcome::Failed {
                    attempt_id: attempt.id,
                    error_code,
                })
            }
        }
    }
}
