//! Scheduler promotion loop.
//!
//! Each cycle reads a bounded batch of due `scheduled` notifications
//! (earliest first), claims each with a conditional update, and publishes the
//! claimed rows to their ready queues. The claim makes promotion safe under
//! concurrent schedulers: a row another instance already flipped is skipped.

use std::time::Duration;

use notifyd_common::AppResult;
use notifyd_core::routing::resolve_ready_queue;
use notifyd_core::PublisherService;
use notifyd_db::repositories::NotificationRepository;
use tracing::{debug, error, info, warn};

/// Scheduler loop configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between promotion cycles.
    pub interval: Duration,
    /// Maximum number of due rows promoted per cycle.
    pub batch_size: u64,
    /// Backoff after a failed due-query.
    pub error_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            batch_size: 100,
            error_backoff: Duration::from_secs(2),
        }
    }
}

impl SchedulerConfig {
    /// Build from the application configuration section.
    #[must_use]
    pub const fn from_config(config: &notifyd_common::config::SchedulerConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            batch_size: config.batch_size,
            error_backoff: Duration::from_secs(config.error_backoff_secs),
        }
    }
}

/// Outcome of one promotion cycle.
///
/// `claimed > published` means the cycle flipped rows to `enqueued` whose
/// ready-queue publish then failed; those rows carry no broker message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Rows this cycle flipped from `scheduled` to `enqueued`.
    pub claimed: usize,
    /// Rows whose ready-queue publish succeeded.
    pub published: usize,
}

/// The promotion loop.
#[derive(Clone)]
pub struct Scheduler {
    notification_repo: NotificationRepository,
    publisher: PublisherService,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        publisher: PublisherService,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            notification_repo,
            publisher,
            config,
        }
    }

    /// Run the loop indefinitely.
    pub async fn run(&self) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            "Scheduler started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            ticker.tick().await;

            if let Err(e) = self.run_cycle().await {
                // Due rows stay due; the next cycle re-reads them.
                warn!(error = %e, "Promotion cycle failed, backing off");
                tokio::time::sleep(self.config.error_backoff).await;
            }
        }
    }

    /// Run one promotion cycle.
    ///
    /// A per-row claim or publish failure is logged and does not block the
    /// remaining rows of the batch.
    pub async fn run_cycle(&self) -> AppResult<CycleStats> {
        let due = self
            .notification_repo
            .find_due_scheduled(self.config.batch_size)
            .await?;

        let mut stats = CycleStats::default();
        for row in due {
            // Claim first: flips scheduled -> enqueued only while the row is
            // still scheduled, so concurrent schedulers never double-publish.
            match self.notification_repo.claim_scheduled(row.id).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(notification_id = row.id, "Row already claimed, skipping");
                    continue;
                }
                Err(e) => {
                    error!(notification_id = row.id, error = %e, "Claim failed");
                    continue;
                }
            }

            stats.claimed += 1;

            let queue = resolve_ready_queue(&row.channel, &row.priority);
            let key = format!("user:{}", row.user_id);

            // A claimed row whose publish fails stays enqueued and
            // unpublished; this is logged, not rolled back.
            if let Err(e) = self.publisher.publish(queue, &key, &row.id.to_string()).await {
                error!(notification_id = row.id, queue, error = %e, "Publish failed");
                continue;
            }

            debug!(notification_id = row.id, queue, "Promoted notification");
            stats.published += 1;
        }

        if stats.claimed > stats.published {
            // These rows are enqueued but never reached a ready queue; they
            // need an external re-publish to move again.
            warn!(
                claimed = stats.claimed,
                published = stats.published,
                "Cycle left claimed rows unpublished"
            );
        } else if stats.published > 0 {
            debug!(published = stats.published, "Promotion cycle complete");
        }

        Ok(stats)
    }
}
