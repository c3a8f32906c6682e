//! DND window endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
};
use notifyd_common::AppResult;
use notifyd_core::UpsertDndInput;
use notifyd_db::entities::dnd_window;
use serde::{Deserialize, Serialize};

use crate::{
    response::{ApiResponse, no_content},
    state::AppState,
};

// ==================== Request/Response Types ====================

/// Upsert DND window request. Times are `HH:MM:SS` local to `timezone`.
#[derive(Debug, Deserialize)]
pub struct UpsertDndRequest {
    pub user_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
}

/// DND window response.
#[derive(Serialize)]
pub struct DndWindowResponse {
    pub user_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
    pub updated_at: String,
}

impl From<dnd_window::Model> for DndWindowResponse {
    fn from(w: dnd_window::Model) -> Self {
        Self {
            user_id: w.user_id,
            start_time: w.start_time.format("%H:%M:%S").to_string(),
            end_time: w.end_time.format("%H:%M:%S").to_string(),
            timezone: w.timezone,
            updated_at: w.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Handlers ====================

/// Upsert a user's DND window.
async fn upsert(
    State(state): State<AppState>,
    Json(req): Json<UpsertDndRequest>,
) -> AppResult<ApiResponse<DndWindowResponse>> {
    let input = UpsertDndInput {
        user_id: req.user_id,
        start_time: req.start_time,
        end_time: req.end_time,
        timezone: req.timezone,
    };

    let window = state.preference_service.upsert_dnd(input).await?;

    Ok(ApiResponse::ok(window.into()))
}

/// Show a user's DND window.
async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<DndWindowResponse>> {
    let window = state.preference_service.get_dnd(user_id).await?;

    Ok(ApiResponse::ok(window.into()))
}

/// Remove a user's DND window.
async fn remove(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.preference_service.delete_dnd(user_id).await?;

    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(upsert))
        .route("/{user_id}", get(show).delete(remove))
}
