//! Dispatch decision engine.
//!
//! Turns one notification request into per-channel rows, deciding for each
//! whether to deliver now or defer past the user's quiet hours, and publishes
//! immediate rows to their ready queues.

use chrono::{DateTime, Utc};
use notifyd_common::{AppError, AppResult};
use notifyd_db::entities::notification::{self, Channel, NotificationStatus, Priority};
use notifyd_db::repositories::{NotificationRepository, PreferenceRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{debug, warn};
use validator::Validate;

use crate::routing::resolve_ready_queue;
use crate::services::dnd::QuietHours;
use crate::services::publisher::PublisherService;

/// Notification types that are delivered immediately regardless of DND.
const DND_BYPASS_TYPES: &[&str] = &["auth.otp", "security.alert"];

/// Maximum serialized payload size in bytes.
const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Input for enqueueing a notification.
#[derive(Debug, Deserialize, Validate)]
pub struct EnqueueInput {
    /// Recipient user.
    pub user_id: i64,
    /// Notification type key, e.g. `order.shipped`.
    #[validate(length(min = 1, max = 128))]
    pub type_key: String,
    /// Requested channels; one row is created per entry.
    #[validate(length(min = 1, max = 8))]
    pub channels: Vec<String>,
    /// Opaque payload bag; serialized once and never interpreted internally.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Priority tier; defaults to low.
    pub priority: Option<Priority>,
    /// Explicit delivery time; overrides DND and priority when present.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Originating campaign, if any.
    pub campaign_id: Option<i64>,
}

/// The dispatch decision engine.
#[derive(Clone)]
pub struct DispatchService {
    notification_repo: NotificationRepository,
    preference_repo: PreferenceRepository,
    publisher: PublisherService,
}

impl DispatchService {
    /// Create a new dispatch service.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        preference_repo: PreferenceRepository,
        publisher: PublisherService,
    ) -> Self {
        Self {
            notification_repo,
            preference_repo,
            publisher,
        }
    }

    /// Enqueue a notification across its requested channels.
    ///
    /// Returns the ids of the created rows in request-channel order. A
    /// persistence failure aborts the remaining channels; rows created before
    /// the failure persist.
    pub async fn enqueue(
        &self,
        input: EnqueueInput,
        idempotency_key: Option<String>,
    ) -> AppResult<Vec<i64>> {
        self.enqueue_at(input, idempotency_key, Utc::now()).await
    }

    /// [`Self::enqueue`] with an explicit "now", for deterministic tests.
    pub async fn enqueue_at(
        &self,
        input: EnqueueInput,
        idempotency_key: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<i64>> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if input.user_id <= 0 {
            return Err(AppError::Validation("user_id must be positive".to_string()));
        }

        // Reject unknown channels before any row is created.
        let channels = input
            .channels
            .iter()
            .map(|key| {
                Channel::from_key(key)
                    .ok_or_else(|| AppError::Validation(format!("Unknown channel: {key}")))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let payload = serde_json::to_vec(&input.payload)
            .map_err(|e| AppError::Validation(format!("Unserializable payload: {e}")))?;
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(AppError::Validation(format!(
                "Payload exceeds {MAX_PAYLOAD_BYTES} bytes"
            )));
        }

        let priority = input.priority.unwrap_or(Priority::Low);
        let scheduled_at = self
            .effective_schedule(input.user_id, &input.type_key, input.scheduled_at, now)
            .await?;
        let status = if scheduled_at.is_some() {
            NotificationStatus::Scheduled
        } else {
            NotificationStatus::Enqueued
        };

        let mut ids = Vec::with_capacity(channels.len());
        for channel in channels {
            let model = notification::ActiveModel {
                idempotency_key: Set(idempotency_key.clone()),
                user_id: Set(input.user_id),
                campaign_id: Set(input.campaign_id),
                type_key: Set(input.type_key.clone()),
                channel: Set(channel.clone()),
                payload: Set(payload.clone()),
                priority: Set(priority.clone()),
                scheduled_at: Set(scheduled_at.map(Into::into)),
                status: Set(status.clone()),
                created_at: Set(now.into()),
                ..Default::default()
            };

            // Abort on the first persistence failure; earlier rows persist.
            let created = self.notification_repo.create(model).await?;
            ids.push(created.id);

            if scheduled_at.is_none() {
                let queue = resolve_ready_queue(&channel, &priority);
                let key = format!("user:{}", input.user_id);
                let value = created.id.to_string();

                // A publish failure leaves the enqueued row unpublished; it
                // is logged, not rolled back.
                if let Err(e) = self.publisher.publish(queue, &key, &value).await {
                    warn!(
                        notification_id = created.id,
                        queue,
                        error = %e,
                        "Failed to publish ready message"
                    );
                } else {
                    debug!(notification_id = created.id, queue, "Published ready message");
                }
            }
        }

        Ok(ids)
    }

    /// Compute the effective delivery time: explicit schedule, then the DND
    /// bypass allowlist, then quiet-hours deferral. `None` means immediate.
    async fn effective_schedule(
        &self,
        user_id: i64,
        type_key: &str,
        explicit: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<DateTime<Utc>>> {
        if explicit.is_some() {
            return Ok(explicit);
        }

        if DND_BYPASS_TYPES.contains(&type_key) {
            return Ok(None);
        }

        let Some(window) = self.preference_repo.find_dnd(user_id).await? else {
            return Ok(None);
        };

        let window = QuietHours::from_model(&window);
        if window.contains(now) {
            Ok(Some(window.next_end(now)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveTime, TimeZone};
    use chrono_tz::Europe::Berlin;
    use notifyd_db::entities::dnd_window;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::{Arc, Mutex};

    /// Publisher that records every publish call.
    #[derive(Clone, Default)]
    struct RecordingPublisher {
        published: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    impl RecordingPublisher {
        fn published(&self) -> Vec<(String, String, String)> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl crate::services::publisher::ReadyQueuePublisher for RecordingPublisher {
        async fn publish(&self, queue: &str, key: &str, value: &str) -> AppResult<()> {
            self.published.lock().unwrap().push((
                queue.to_string(),
                key.to_string(),
                value.to_string(),
            ));
            Ok(())
        }
    }

    fn service_with(
        db: MockDatabase,
    ) -> (DispatchService, RecordingPublisher) {
        let db = Arc::new(db.into_connection());
        let publisher = RecordingPublisher::default();
        let service = DispatchService::new(
            NotificationRepository::new(Arc::clone(&db)),
            PreferenceRepository::new(db),
            Arc::new(publisher.clone()),
        );
        (service, publisher)
    }

    fn input(type_key: &str, channels: &[&str]) -> EnqueueInput {
        EnqueueInput {
            user_id: 42,
            type_key: type_key.to_string(),
            channels: channels.iter().map(ToString::to_string).collect(),
            payload: serde_json::json!({"subject": "hi"}),
            priority: None,
            scheduled_at: None,
            campaign_id: None,
        }
    }

    fn created_row(id: i64, channel: Channel, status: NotificationStatus) -> notification::Model {
        notification::Model {
            id,
            idempotency_key: None,
            user_id: 42,
            campaign_id: None,
            type_key: "marketing".to_string(),
            channel,
            payload: b"{}".to_vec(),
            priority: Priority::Low,
            scheduled_at: None,
            status,
            created_at: Utc::now().into(),
        }
    }

    fn berlin_dnd() -> dnd_window::Model {
        dnd_window::Model {
            user_id: 42,
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            timezone: "Europe/Berlin".to_string(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_no_dnd_no_schedule_is_immediate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<dnd_window::Model>::new()])
            .append_query_results([[created_row(
                1,
                Channel::Email,
                NotificationStatus::Enqueued,
            )]]);

        let (service, publisher) = service_with(db);
        let ids = service
            .enqueue(input("marketing", &["email"]), None)
            .await
            .unwrap();

        assert_eq!(ids, vec![1]);
        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "notifications.ready.email.low");
        assert_eq!(published[0].1, "user:42");
        assert_eq!(published[0].2, "1");
    }

    #[tokio::test]
    async fn test_request_inside_dnd_window_is_deferred() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[berlin_dnd()]])
            .append_query_results([[created_row(
                7,
                Channel::Email,
                NotificationStatus::Scheduled,
            )]]);

        let (service, publisher) = service_with(db);

        // 23:30 local in Berlin, inside the 22:00-06:00 window.
        let now = Berlin
            .with_ymd_and_hms(2025, 7, 15, 23, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let ids = service
            .enqueue_at(input("marketing", &["email"]), None, now)
            .await
            .unwrap();

        assert_eq!(ids, vec![7]);
        // Deferred rows are not published.
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_bypass_listed_type_ignores_dnd() {
        // No DND query is issued: the allowlist short-circuits.
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            created_row(3, Channel::Email, NotificationStatus::Enqueued),
        ]]);

        let (service, publisher) = service_with(db);

        let mut req = input("auth.otp", &["email"]);
        req.priority = Some(Priority::High);

        let now = Berlin
            .with_ymd_and_hms(2025, 7, 15, 23, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let ids = service.enqueue_at(req, None, now).await.unwrap();

        assert_eq!(ids, vec![3]);
        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "notifications.ready.email.high");
    }

    #[tokio::test]
    async fn test_explicit_schedule_is_honored_verbatim() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            created_row(9, Channel::Sms, NotificationStatus::Scheduled),
        ]]);

        let (service, publisher) = service_with(db);

        let mut req = input("marketing", &["sms"]);
        req.scheduled_at = Some(Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap());

        let ids = service.enqueue(req, None).await.unwrap();

        assert_eq!(ids, vec![9]);
        // No DND lookup, no publish.
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_one_row_per_requested_channel() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<dnd_window::Model>::new()])
            .append_query_results([[created_row(
                1,
                Channel::Email,
                NotificationStatus::Enqueued,
            )]])
            .append_query_results([[created_row(
                2,
                Channel::Push,
                NotificationStatus::Enqueued,
            )]]);

        let (service, publisher) = service_with(db);
        let ids = service
            .enqueue(input("order.shipped", &["email", "push"]), None)
            .await
            .unwrap();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(publisher.published().len(), 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_aborts_remaining_channels() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<dnd_window::Model>::new()])
            .append_query_results([[created_row(
                1,
                Channel::Email,
                NotificationStatus::Enqueued,
            )]])
            .append_query_errors([sea_orm::DbErr::Custom("connection reset".to_string())]);

        let (service, publisher) = service_with(db);
        let result = service
            .enqueue(input("order.shipped", &["email", "push"]), None)
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        // The first channel was published before the failure.
        assert_eq!(publisher.published().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_channel_rejected_before_persistence() {
        let (service, publisher) = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .enqueue(input("marketing", &["email", "pigeon"]), None)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_empty_channels_rejected() {
        let (service, _) = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.enqueue(input("marketing", &[]), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
