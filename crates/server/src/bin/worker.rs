//! notifyd channel worker entry point.
//!
//! One process consumes one ready queue, selected by the worker configuration
//! section. The in-app channel writes inbox rows; every other channel logs the
//! delivery until a real provider integration lands.

use std::sync::Arc;

use notifyd_common::Config;
use notifyd_core::{DeliveryService, TransportService};
use notifyd_db::entities::notification::Channel;
use notifyd_db::repositories::{
    DeliveryAttemptRepository, InAppRepository, NotificationRepository,
};
use notifyd_queue::{ChannelWorker, InAppTransport, LogTransport, MessageHandler, RedisBroker};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notifyd=debug,sqlx=warn".into()),
        )
        .init();

    let config = Config::load()?;
    info!(
        channel = %config.worker.channel,
        priority = %config.worker.priority,
        "Starting notifyd worker..."
    );

    let db = notifyd_db::init(&config).await?;
    info!("Connected to database");

    let broker = RedisBroker::connect(&config.redis).await?;

    let db = Arc::new(db);
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let attempt_repo = DeliveryAttemptRepository::new(Arc::clone(&db));

    let channel = Channel::from_key(&config.worker.channel).unwrap_or_else(|| {
        warn!(
            channel = %config.worker.channel,
            "Unknown worker channel, falling back to inapp"
        );
        Channel::InApp
    });
    let transport: TransportService = match channel {
        Channel::InApp => Arc::new(InAppTransport::new(InAppRepository::new(Arc::clone(&db)))),
        other => Arc::new(LogTransport::new(other)),
    };

    let delivery = DeliveryService::new(notification_repo.clone(), attempt_repo, transport);
    let handler = MessageHandler::new(notification_repo, delivery);

    let worker = ChannelWorker::from_config(broker, handler, &config.worker);
    worker.run().await?;
    Ok(())
}
