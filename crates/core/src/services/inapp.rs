//! In-app inbox service.

use notifyd_common::AppResult;
use notifyd_db::entities::inapp_notification;
use notifyd_db::repositories::InAppRepository;

/// Maximum page size for inbox listings.
const MAX_LIST_LIMIT: u64 = 100;

/// Service over the in-app inbox.
#[derive(Clone)]
pub struct InAppService {
    inapp_repo: InAppRepository,
}

impl InAppService {
    /// Create a new in-app service.
    #[must_use]
    pub const fn new(inapp_repo: InAppRepository) -> Self {
        Self { inapp_repo }
    }

    /// A user's inbox, newest first.
    pub async fn list(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<inapp_notification::Model>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        self.inapp_repo
            .list_for_user(user_id, unread_only, limit, offset)
            .await
    }

    /// Mark an inbox row as read.
    pub async fn mark_read(&self, id: i64) -> AppResult<inapp_notification::Model> {
        self.inapp_repo.mark_read(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_row(id: i64, is_read: bool) -> inapp_notification::Model {
        inapp_notification::Model {
            id,
            user_id: 42,
            type_key: "order.shipped".to_string(),
            title: None,
            body: "Your order is on the way".to_string(),
            metadata: None,
            is_read,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_returns_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_row(2, false), test_row(1, true)]]);

        let service = InAppService::new(InAppRepository::new(Arc::new(db.into_connection())));
        let rows = service.list(42, false, 20, 0).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let unread = test_row(1, false);
        let mut read = unread.clone();
        read.is_read = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![unread], vec![read]]);

        let service = InAppService::new(InAppRepository::new(Arc::new(db.into_connection())));
        let row = service.mark_read(1).await.unwrap();
        assert!(row.is_read);
    }
}
