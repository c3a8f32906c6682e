//! Delivery attempt repository.

use std::sync::Arc;

use chrono::Utc;
use notifyd_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::delivery_attempt::AttemptStatus;
use crate::entities::{DeliveryAttempt, delivery_attempt};

#[derive(FromQueryResult)]
struct MaxAttemptNo {
    max_no: Option<i32>,
}

/// Delivery attempt repository for database operations.
#[derive(Clone)]
pub struct DeliveryAttemptRepository {
    db: Arc<DatabaseConnection>,
}

impl DeliveryAttemptRepository {
    /// Create a new delivery attempt repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Next attempt number for a notification (1-based, never reused).
    pub async fn next_attempt_no(&self, notification_id: i64) -> AppResult<i32> {
        let row = DeliveryAttempt::find()
            .select_only()
            .column_as(delivery_attempt::Column::AttemptNo.max(), "max_no")
            .filter(delivery_attempt::Column::NotificationId.eq(notification_id))
            .into_model::<MaxAttemptNo>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.and_then(|r| r.max_no).unwrap_or(0) + 1)
    }

    /// Insert a pending attempt, written before the delivery side effect runs.
    pub async fn create_pending(
        &self,
        notification_id: i64,
        attempt_no: i32,
    ) -> AppResult<delivery_attempt::Model> {
        let model = delivery_attempt::ActiveModel {
            notification_id: Set(notification_id),
            attempt_no: Set(attempt_no),
            provider_message_id: Set(None),
            status: Set(AttemptStatus::Pending),
            error_code: Set(None),
            error_message: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an attempt by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<delivery_attempt::Model>> {
        DeliveryAttempt::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an attempt by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<delivery_attempt::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Delivery attempt {id} not found")))
    }

    /// Mark an attempt as successful.
    pub async fn mark_success(
        &self,
        id: i64,
        provider_message_id: Option<&str>,
    ) -> AppResult<delivery_attempt::Model> {
        let attempt = self.get_by_id(id).await?;
        let mut active: delivery_attempt::ActiveModel = attempt.into();
        active.status = Set(AttemptStatus::Success);
        active.provider_message_id = Set(provider_message_id.map(ToString::to_string));
        self.update(active).await
    }

    /// Mark an attempt as failed.
    pub async fn mark_failed(
        &self,
        id: i64,
        error_code: Option<&str>,
        error_message: &str,
    ) -> AppResult<delivery_attempt::Model> {
        let attempt = self.get_by_id(id).await?;
        let mut active: delivery_attempt::ActiveModel = attempt.into();
        active.status = Set(AttemptStatus::Failed);
        active.error_code = Set(error_code.map(ToString::to_string));
        active.error_message = Set(Some(error_message.to_string()));
        self.update(active).await
    }

    /// Attempt history for a notification, newest attempt first.
    pub async fn find_by_notification(
        &self,
        notification_id: i64,
    ) -> AppResult<Vec<delivery_attempt::Model>> {
        DeliveryAttempt::find()
            .filter(delivery_attempt::Column::NotificationId.eq(notification_id))
            .order_by_desc(delivery_attempt::Column::AttemptNo)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recent failed attempts, for the external retry driver.
    pub async fn find_failed(&self, limit: u64) -> AppResult<Vec<delivery_attempt::Model>> {
        DeliveryAttempt::find()
            .filter(delivery_attempt::Column::Status.eq(AttemptStatus::Failed))
            .order_by_desc(delivery_attempt::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn update(
        &self,
        model: delivery_attempt::ActiveModel,
    ) -> AppResult<delivery_attempt::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
