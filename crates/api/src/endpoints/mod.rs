//! API endpoints.

mod dnd;
mod inapp;
mod notifications;
mod preferences;

use axum::{Json, Router, routing::get};
use serde_json::json;

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/notifications", notifications::router())
        .nest("/api/v1/preferences", preferences::router())
        .nest("/api/v1/dnd", dnd::router())
        .nest("/api/v1/inapp", inapp::router())
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_utils {
    use axum::{Router, body::Body, http::Request};
    use notifyd_core::{
        DispatchService, InAppService, NoOpPublisher, NotificationService, PreferenceService,
    };
    use notifyd_db::repositories::{
        DeliveryAttemptRepository, InAppRepository, NotificationRepository, PreferenceRepository,
    };
    use sea_orm::MockDatabase;
    use std::sync::Arc;

    use crate::state::AppState;

    /// Build the full router over a mock database, with a no-op publisher.
    pub fn app(db: MockDatabase) -> Router {
        let db = Arc::new(db.into_connection());
        let state = AppState {
            dispatch_service: DispatchService::new(
                NotificationRepository::new(Arc::clone(&db)),
                PreferenceRepository::new(Arc::clone(&db)),
                Arc::new(NoOpPublisher),
            ),
            notification_service: NotificationService::new(
                NotificationRepository::new(Arc::clone(&db)),
                DeliveryAttemptRepository::new(Arc::clone(&db)),
            ),
            preference_service: PreferenceService::new(PreferenceRepository::new(Arc::clone(&db))),
            inapp_service: InAppService::new(InAppRepository::new(db)),
        };
        super::router().with_state(state)
    }

    /// Build a request, JSON-encoding the body when present.
    pub fn request(method: &str, uri: &str, body: Option<&serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(value).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}
