//! notifyd promotion scheduler entry point.
//!
//! Scans for due scheduled notifications, claims them, and publishes each to
//! its ready queue. Runs until interrupted.

use std::sync::Arc;

use notifyd_common::Config;
use notifyd_core::PublisherService;
use notifyd_db::repositories::NotificationRepository;
use notifyd_queue::{RedisBroker, Scheduler, SchedulerConfig};
use tracing::info;
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

    info!("Starting notifyd scheduler...");

    let config = Config::load()?;

    let db = notifyd_db::init(&config).await?;
    info!("Connected to database");

    let broker = RedisBroker::connect(&config.redis).await?;
    let publisher: PublisherService = Arc::new(broker);

    let scheduler = Scheduler::new(
        NotificationRepository::new(Arc::new(db)),
        publisher,
        SchedulerConfig::from_config(&config.scheduler),
    );

    scheduler.run().await;
    Ok(())
}
