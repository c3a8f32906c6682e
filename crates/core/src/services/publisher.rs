//! Ready-queue publisher seam.
//!
//! Core services publish to broker queues through this trait; the concrete
//! Redis Streams implementation lives in the queue crate.

use async_trait::async_trait;
use notifyd_common::AppResult;
use std::sync::Arc;

/// Trait for publishing to a ready queue.
///
/// The key carries partition affinity (`user:<id>`); the value is the decimal
/// notification id.
#[async_trait]
pub trait ReadyQueuePublisher: Send + Sync {
    /// Publish one message to the named queue.
    async fn publish(&self, queue: &str, key: &str, value: &str) -> AppResult<()>;
}

/// A no-op publisher for tests or broker-less setups.
#[derive(Clone, Default)]
pub struct NoOpPublisher;

#[async_trait]
impl ReadyQueuePublisher for NoOpPublisher {
    async fn publish(&self, _queue: &str, _key: &str, _value: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `ReadyQueuePublisher` trait object.
pub type PublisherService = Arc<dyn ReadyQueuePublisher>;
