//! notifyd API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use notifyd_api::{AppState, router as api_router};
use notifyd_common::Config;
use notifyd_core::{
    DispatchService, InAppService, NotificationService, PreferenceService, PublisherService,
};
use notifyd_db::repositories::{
    DeliveryAttemptRepository, InAppRepository, NotificationRepository, PreferenceRepository,
};
use notifyd_queue::RedisBroker;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notifyd=debug,tower_http=debug,sqlx=warn".into()),
        )
        .init();

    info!("Starting notifyd server...");

    let config = Config::load()?;

    let db = notifyd_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    notifyd_db::migrate(&db).await?;
    info!("Migrations completed");

    let broker = RedisBroker::connect(&config.redis).await?;
    let publisher: PublisherService = Arc::new(broker);

    // Repositories
    let db = Arc::new(db);
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let attempt_repo = DeliveryAttemptRepository::new(Arc::clone(&db));
    let preference_repo = PreferenceRepository::new(Arc::clone(&db));
    let inapp_repo = InAppRepository::new(Arc::clone(&db));

    // Services
    let state = AppState {
        dispatch_service: DispatchService::new(
            notification_repo.clone(),
            preference_repo.clone(),
            publisher,
        ),
        notification_service: NotificationService::new(
            notification_repo.clone(),
            attempt_repo.clone(),
        ),
        preference_service: PreferenceService::new(preference_repo),
        inapp_service: InAppService::new(inapp_repo),
    };

    let app = api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
