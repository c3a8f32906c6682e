//! Preference and DND window repository.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use notifyd_common::{AppError, AppResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::notification::Channel;
use crate::entities::{ChannelPreference, DndWindow, channel_preference, dnd_window};

/// Repository for channel preferences and DND windows.
#[derive(Clone)]
pub struct PreferenceRepository {
    db: Arc<DatabaseConnection>,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Upsert an opt-in preference on the (user, type key, channel) triple.
    pub async fn upsert_preference(
        &self,
        user_id: i64,
        type_key: &str,
        channel: Channel,
        opted_in: bool,
    ) -> AppResult<channel_preference::Model> {
        let model = channel_preference::ActiveModel {
            user_id: Set(user_id),
            type_key: Set(type_key.to_string()),
            channel: Set(channel),
            opted_in: Set(opted_in),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        ChannelPreference::insert(model)
            .on_conflict(
                OnConflict::columns([
                    channel_preference::Column::UserId,
                    channel_preference::Column::TypeKey,
                    channel_preference::Column::Channel,
                ])
                .update_columns([
                    channel_preference::Column::OptedIn,
                    channel_preference::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a user accepts a (type key, channel) pair. Missing rows mean
    /// opted in.
    pub async fn is_opted_in(
        &self,
        user_id: i64,
        type_key: &str,
        channel: Channel,
    ) -> AppResult<bool> {
        let row = ChannelPreference::find()
            .filter(channel_preference::Column::UserId.eq(user_id))
            .filter(channel_preference::Column::TypeKey.eq(type_key))
            .filter(channel_preference::Column::Channel.eq(channel))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.is_none_or(|p| p.opted_in))
    }

    /// All explicitly set preferences for a user.
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<channel_preference::Model>> {
        ChannelPreference::find()
            .filter(channel_preference::Column::UserId.eq(user_id))
            .order_by_asc(channel_preference::Column::TypeKey)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's DND window.
    pub async fn find_dnd(&self, user_id: i64) -> AppResult<Option<dnd_window::Model>> {
        DndWindow::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upsert a user's DND window.
    pub async fn upsert_dnd(
        &self,
        user_id: i64,
        start_time: NaiveTime,
        end_time: NaiveTime,
        timezone: &str,
    ) -> AppResult<dnd_window::Model> {
        let model = dnd_window::ActiveModel {
            user_id: Set(user_id),
            start_time: Set(start_time),
            end_time: Set(end_time),
            timezone: Set(timezone.to_string()),
            updated_at: Set(Utc::now().into()),
        };

        DndWindow::insert(model)
            .on_conflict(
                OnConflict::column(dnd_window::Column::UserId)
                    .update_columns([
                        dnd_window::Column::StartTime,
                        dnd_window::Column::EndTime,
                        dnd_window::Column::Timezone,
                        dnd_window::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a user's DND window.
    pub async fn delete_dnd(&self, user_id: i64) -> AppResult<()> {
        let result = DndWindow::delete_by_id(user_id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "DND window for user {user_id} not found"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_preference(user_id: i64, opted_in: bool) -> channel_preference::Model {
        channel_preference::Model {
            id: 1,
            user_id,
            type_key: "marketing".to_string(),
            channel: Channel::Email,
            opted_in,
            updated_at: Utc::now().into(),
        }
    }

    fn test_dnd(user_id: i64) -> dnd_window::Model {
        dnd_window::Model {
            user_id,
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            timezone: "Europe/Berlin".to_string(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_opted_in_defaults_to_true() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<channel_preference::Model>::new()])
                .into_connection(),
        );

        let repo = PreferenceRepository::new(db);
        assert!(repo.is_opted_in(42, "marketing", Channel::Email).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_opted_in_respects_opt_out() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_preference(42, false)]])
                .into_connection(),
        );

        let repo = PreferenceRepository::new(db);
        assert!(!repo.is_opted_in(42, "marketing", Channel::Email).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_dnd_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<dnd_window::Model>::new()])
                .into_connection(),
        );

        let repo = PreferenceRepository::new(db);
        assert!(repo.find_dnd(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_dnd_present() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_dnd(42)]])
                .into_connection(),
        );

        let repo = PreferenceRepository::new(db);
        let window = repo.find_dnd(42).await.unwrap().unwrap();
        assert_eq!(window.timezone, "Europe/Berlin");
    }

    #[tokio::test]
    async fn test_delete_dnd_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = PreferenceRepository::new(db);
        let result = repo.delete_dnd(42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
