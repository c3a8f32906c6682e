//! In-app inbox repository.

use std::sync::Arc;

use notifyd_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{InAppNotification, inapp_notification};

/// In-app inbox repository for database operations.
#[derive(Clone)]
pub struct InAppRepository {
    db: Arc<DatabaseConnection>,
}

impl InAppRepository {
    /// Create a new in-app repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert an inbox row.
    pub async fn create(
        &self,
        model: inapp_notification::ActiveModel,
    ) -> AppResult<inapp_notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's inbox, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<inapp_notification::Model>> {
        let mut query = InAppNotification::find()
            .filter(inapp_notification::Column::UserId.eq(user_id))
            .order_by_desc(inapp_notification::Column::CreatedAt);

        if unread_only {
            query = query.filter(inapp_notification::Column::IsRead.eq(false));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an inbox row by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<inapp_notification::Model> {
        InAppNotification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("In-app notification {id} not found")))
    }

    /// Mark an inbox row as read.
    pub async fn mark_read(&self, id: i64) -> AppResult<inapp_notification::Model> {
        let row = self.get_by_id(id).await?;
        let mut active: inapp_notification::ActiveModel = row.into();
        active.is_read = Set(true);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
