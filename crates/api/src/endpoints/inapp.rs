//! In-app inbox endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use notifyd_common::AppResult;
use notifyd_db::entities::inapp_notification;
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

// ==================== Request/Response Types ====================

/// Inbox listing query.
#[derive(Debug, Deserialize)]
pub struct ListInboxQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Inbox row response.
#[derive(Serialize)]
pub struct InboxItemResponse {
    pub id: i64,
    pub user_id: i64,
    pub type_key: String,
    pub title: Option<String>,
    pub body: String,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<inapp_notification::Model> for InboxItemResponse {
    fn from(row: inapp_notification::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            type_key: row.type_key,
            title: row.title,
            body: row.body,
            metadata: row.metadata,
            is_read: row.is_read,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

// ==================== Handlers ====================

/// A user's inbox, newest first.
async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListInboxQuery>,
) -> AppResult<ApiResponse<Vec<InboxItemResponse>>> {
    let rows = state
        .inapp_service
        .list(user_id, query.unread_only, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// Mark an inbox row as read.
async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<InboxItemResponse>> {
    let row = state.inapp_service.mark_read(id).await?;

    Ok(ApiResponse::ok(row.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(list))
        .route("/{id}/read", post(mark_read))
}
