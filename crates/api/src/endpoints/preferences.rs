//! Channel preference endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use notifyd_common::AppResult;
use notifyd_core::UpsertPreferenceInput;
use notifyd_db::entities::channel_preference;
use notifyd_db::entities::notification::Channel;
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

// ==================== Request/Response Types ====================

/// Upsert preference request.
#[derive(Debug, Deserialize)]
pub struct UpsertPreferenceRequest {
    pub user_id: i64,
    pub type_key: String,
    pub channel: String,
    pub opted_in: bool,
}

/// Channel preference response.
#[derive(Serialize)]
pub struct PreferenceResponse {
    pub user_id: i64,
    pub type_key: String,
    pub channel: Channel,
    pub opted_in: bool,
    pub updated_at: String,
}

impl From<channel_preference::Model> for PreferenceResponse {
    fn from(p: channel_preference::Model) -> Self {
        Self {
            user_id: p.user_id,
            type_key: p.type_key,
            channel: p.channel,
            opted_in: p.opted_in,
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Handlers ====================

/// Upsert an opt-in preference.
async fn upsert(
    State(state): State<AppState>,
    Json(req): Json<UpsertPreferenceRequest>,
) -> AppResult<ApiResponse<PreferenceResponse>> {
    let input = UpsertPreferenceInput {
        user_id: req.user_id,
        type_key: req.type_key,
        channel: req.channel,
        opted_in: req.opted_in,
    };

    let preference = state.preference_service.upsert_preference(input).await?;

    Ok(ApiResponse::ok(preference.into()))
}

/// All explicitly set preferences for a user.
async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<PreferenceResponse>>> {
    let preferences = state.preference_service.list_preferences(user_id).await?;

    Ok(ApiResponse::ok(
        preferences.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(upsert))
        .route("/{user_id}", get(list))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::endpoints::test_utils::{app, request};
    use axum::http::StatusCode;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use tower::ServiceExt;

    fn test_preference(opted_in: bool) -> channel_preference::Model {
        channel_preference::Model {
            id: 1,
            user_id: 42,
            type_key: "marketing".to_string(),
            channel: Channel::Email,
            opted_in,
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_upsert_preference() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_preference(false)]]);

        let body = json!({
            "user_id": 42,
            "type_key": "marketing",
            "channel": "email",
            "opted_in": false
        });
        let response = app(db)
            .oneshot(request("PUT", "/api/v1/preferences", Some(&body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upsert_unknown_channel_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let body = json!({
            "user_id": 42,
            "type_key": "marketing",
            "channel": "pigeon",
            "opted_in": false
        });
        let response = app(db)
            .oneshot(request("PUT", "/api/v1/preferences", Some(&body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_preferences() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_preference(true)]]);

        let response = app(db)
            .oneshot(request("GET", "/api/v1/preferences/42", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
