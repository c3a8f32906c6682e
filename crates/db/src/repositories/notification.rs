//! Notification repository.

use std::sync::Arc;

use chrono::Utc;
use notifyd_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};

use crate::entities::notification::NotificationStatus;
use crate::entities::{Notification, notification};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a notification row.
    ///
    /// A unique-key violation (duplicate idempotency key) surfaces as
    /// [`AppError::Conflict`]; the row from the earlier call is untouched.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("idempotency key already used".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a notification by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<notification::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))
    }

    /// Find scheduled notifications that are due, earliest first.
    pub async fn find_due_scheduled(&self, limit: u64) -> AppResult<Vec<notification::Model>> {
        let now = Utc::now();

        Notification::find()
            .filter(notification::Column::Status.eq(NotificationStatus::Scheduled))
            .filter(notification::Column::ScheduledAt.lte(now))
            .order_by_asc(notification::Column::ScheduledAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically claim a scheduled notification for promotion.
    ///
    /// Flips `scheduled` to `enqueued` only while the row is still
    /// `scheduled`; returns whether this caller won the claim. A concurrent
    /// scheduler that already claimed the row sees zero rows affected.
    pub async fn claim_scheduled(&self, id: i64) -> AppResult<bool> {
        let result = Notification::update_many()
            .col_expr(
                notification::Column::Status,
                Expr::value(NotificationStatus::Enqueued),
            )
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::Status.eq(NotificationStatus::Scheduled))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Set a notification's status, scoped by id.
    pub async fn update_status(&self, id: i64, status: NotificationStatus) -> AppResult<()> {
        Notification::update_many()
            .col_expr(notification::Column::Status, Expr::value(status))
            .filter(notification::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::notification::{Channel, Priority};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_notification(id: i64, status: NotificationStatus) -> notification::Model {
        notification::Model {
            id,
            idempotency_key: None,
            user_id: 42,
            campaign_id: None,
            type_key: "order.shipped".to_string(),
            channel: Channel::Email,
            payload: b"{}".to_vec(),
            priority: Priority::Low,
            scheduled_at: Some((Utc::now() - chrono::Duration::minutes(5)).into()),
            status,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let row = test_notification(1, NotificationStatus::Enqueued);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();
        assert_eq!(result.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.get_by_id(99).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_due_scheduled() {
        let rows = vec![
            test_notification(1, NotificationStatus::Scheduled),
            test_notification(2, NotificationStatus::Scheduled),
        ];
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.find_due_scheduled(100).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 1);
    }

    #[tokio::test]
    async fn test_claim_scheduled_wins() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        assert!(repo.claim_scheduled(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_scheduled_already_taken() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        assert!(!repo.claim_scheduled(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_maps_database_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([sea_orm::DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let model: notification::ActiveModel =
            test_notification(0, NotificationStatus::Enqueued).into();
        let result = repo.create(model).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
