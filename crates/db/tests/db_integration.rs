//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `notifyd_test`)
//!   `TEST_DB_PASSWORD` (default: `notifyd_test`)
//!   `TEST_DB_NAME` (default: `notifyd_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use notifyd_common::AppError;
use notifyd_db::entities::notification::{self, Channel, NotificationStatus, Priority};
use notifyd_db::repositories::NotificationRepository;
use notifyd_db::test_utils::{TestDatabase, TestDbConfig, TestRedisConfig};
use sea_orm::ActiveValue::{NotSet, Set};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = notifyd_db::migrate(db.connection()).await;
    assert!(result.is_ok(), "Migrations failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_execute_query() {
    let db = TestDatabase::new().await.expect("Failed to connect");

    // Connection should be valid
    use sea_orm::ConnectionTrait;
    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await;

    assert!(result.is_ok(), "Query failed: {:?}", result.err());
}

async fn setup() -> TestDatabase {
    let db = TestDatabase::new().await.expect("Failed to connect");
    notifyd_db::migrate(db.connection())
        .await
        .expect("Migrations failed");
    db.cleanup().await.expect("Cleanup failed");
    db
}

fn notification_row(
    key: Option<&str>,
    status: NotificationStatus,
) -> notification::ActiveModel {
    notification::ActiveModel {
        id: NotSet,
        idempotency_key: Set(key.map(str::to_string)),
        user_id: Set(7),
        campaign_id: Set(None),
        type_key: Set("order.shipped".to_string()),
        channel: Set(Channel::Email),
        payload: Set(b"{}".to_vec()),
        priority: Set(Priority::Low),
        scheduled_at: Set(Some(Utc::now().into())),
        status: Set(status),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_idempotency_key_is_conflict() {
    let db = setup().await;
    let repo = NotificationRepository::new(Arc::new(db.conn));

    let first = repo
        .create(notification_row(Some("req-a1b2"), NotificationStatus::Enqueued))
        .await
        .expect("First insert failed");

    let second = repo
        .create(notification_row(Some("req-a1b2"), NotificationStatus::Enqueued))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    // The first row is untouched by the rejected insert.
    let found = repo.get_by_id(first.id).await.unwrap();
    assert_eq!(found.idempotency_key.as_deref(), Some("req-a1b2"));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_distinct_idempotency_keys_both_insert() {
    let db = setup().await;
    let repo = NotificationRepository::new(Arc::new(db.conn));

    let a = repo
        .create(notification_row(Some("req-one"), NotificationStatus::Enqueued))
        .await
        .unwrap();
    let b = repo
        .create(notification_row(Some("req-two"), NotificationStatus::Enqueued))
        .await
        .unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_claim_scheduled_second_claim_loses() {
    let db = setup().await;
    let repo = NotificationRepository::new(Arc::new(db.conn));

    let row = repo
        .create(notification_row(None, NotificationStatus::Scheduled))
        .await
        .unwrap();

    assert!(repo.claim_scheduled(row.id).await.unwrap());
    assert!(!repo.claim_scheduled(row.id).await.unwrap());

    let claimed = repo.get_by_id(row.id).await.unwrap();
    assert_eq!(claimed.status, NotificationStatus::Enqueued);
}

#[test]
fn test_config_from_env() {
    // Test that default config is valid
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_redis_config_from_env() {
    let config = TestRedisConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
