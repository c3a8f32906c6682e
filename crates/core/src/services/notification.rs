//! Notification read-side service.

use notifyd_common::AppResult;
use notifyd_db::entities::{delivery_attempt, notification};
use notifyd_db::repositories::{DeliveryAttemptRepository, NotificationRepository};

/// Read-side service over notifications and their attempt history.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    attempt_repo: DeliveryAttemptRepository,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        attempt_repo: DeliveryAttemptRepository,
    ) -> Self {
        Self {
            notification_repo,
            attempt_repo,
        }
    }

    /// Get a notification by id, erroring when absent.
    pub async fn get_by_id(&self, id: i64) -> AppResult<notification::Model> {
        self.notification_repo.get_by_id(id).await
    }

    /// Attempt history for a notification, newest attempt first.
    pub async fn list_attempts(
        &self,
        notification_id: i64,
    ) -> AppResult<Vec<delivery_attempt::Model>> {
        // 404 when the notification itself does not exist.
        self.notification_repo.get_by_id(notification_id).await?;
        self.attempt_repo.find_by_notification(notification_id).await
    }

    /// Recent failed attempts, the hook for an external retry driver.
    pub async fn list_failed_attempts(
        &self,
        limit: u64,
    ) -> AppResult<Vec<delivery_attempt::Model>> {
        self.attempt_repo.find_failed(limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use notifyd_common::AppError;
    use notifyd_db::entities::delivery_attempt::AttemptStatus;
    use notifyd_db::entities::notification::{Channel, NotificationStatus, Priority};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_notification(id: i64) -> notification::Model {
        notification::Model {
            id,
            idempotency_key: None,
            user_id: 42,
            campaign_id: None,
            type_key: "order.shipped".to_string(),
            channel: Channel::Email,
            payload: b"{}".to_vec(),
            priority: Priority::Low,
            scheduled_at: None,
            status: NotificationStatus::Sent,
            created_at: Utc::now().into(),
        }
    }

    fn test_attempt(id: i64, attempt_no: i32) -> delivery_attempt::Model {
        delivery_attempt::Model {
            id,
            notification_id: 7,
            attempt_no,
            provider_message_id: None,
            status: AttemptStatus::Success,
            error_code: None,
            error_message: None,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> NotificationService {
        let db = Arc::new(db.into_connection());
        NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            DeliveryAttemptRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_list_attempts_unknown_notification_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<notification::Model>::new()]);

        let result = service(db).list_attempts(99).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_attempts_newest_first() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_notification(7)]])
            .append_query_results([vec![test_attempt(2, 2), test_attempt(1, 1)]]);

        let attempts = service(db).list_attempts(7).await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].attempt_no, 2);
    }
}
