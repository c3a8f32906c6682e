//! Notification endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use notifyd_common::AppResult;
use notifyd_core::EnqueueInput;
use notifyd_db::entities::{delivery_attempt, notification};
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

// ==================== Request/Response Types ====================

/// Enqueue request.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub user_id: i64,
    pub type_key: String,
    pub channels: Vec<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub priority: Option<notification::Priority>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub campaign_id: Option<i64>,
}

/// Enqueue response: the ids of the created rows, in request-channel order.
#[derive(Serialize)]
pub struct EnqueueResponse {
    pub ids: Vec<i64>,
}

/// Notification response.
#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    pub campaign_id: Option<i64>,
    pub type_key: String,
    pub channel: notification::Channel,
    pub payload: serde_json::Value,
    pub priority: notification::Priority,
    pub scheduled_at: Option<String>,
    pub status: notification::NotificationStatus,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            campaign_id: n.campaign_id,
            type_key: n.type_key,
            channel: n.channel,
            payload: serde_json::from_slice(&n.payload).unwrap_or(serde_json::Value::Null),
            priority: n.priority,
            scheduled_at: n.scheduled_at.map(|dt| dt.to_rfc3339()),
            status: n.status,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Delivery attempt response.
#[derive(Serialize)]
pub struct DeliveryAttemptResponse {
    pub id: i64,
    pub notification_id: i64,
    pub attempt_no: i32,
    pub provider_message_id: Option<String>,
    pub status: delivery_attempt::AttemptStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
}

impl From<delivery_attempt::Model> for DeliveryAttemptResponse {
    fn from(a: delivery_attempt::Model) -> Self {
        Self {
            id: a.id,
            notification_id: a.notification_id,
            attempt_no: a.attempt_no,
            provider_message_id: a.provider_message_id,
            status: a.status,
            error_code: a.error_code,
            error_message: a.error_message,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

// ==================== Handlers ====================

/// Enqueue a notification across its requested channels.
async fn enqueue(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<EnqueueRequest>,
) -> AppResult<Response> {
    let idempotency_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let input = EnqueueInput {
        user_id: req.user_id,
        type_key: req.type_key,
        channels: req.channels,
        payload: req.payload,
        priority: req.priority,
        scheduled_at: req.scheduled_at,
        campaign_id: req.campaign_id,
    };

    let ids = state.dispatch_service.enqueue(input, idempotency_key).await?;

    Ok(ApiResponse::created(EnqueueResponse { ids }))
}

/// Show a notification.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state.notification_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(notification.into()))
}

/// Attempt history for a notification, newest first.
async fn attempts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<DeliveryAttemptResponse>>> {
    let attempts = state.notification_service.list_attempts(id).await?;

    Ok(ApiResponse::ok(attempts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(enqueue))
        .route("/{id}", get(show))
        .route("/{id}/attempts", get(attempts))
}
