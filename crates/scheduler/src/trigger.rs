//! Newsletter fan-out trigger.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use sqlx::PgPool;

use gamedex_catalog::subscribers::find_subscribed_recipients;
use gamedex_common::error::AppError;
use gamedex_common::types::NewsletterJob;
use gamedex_notifier::queue::NewsletterQueue;

/// Enumerates subscribers and emits one channel job per recipient.
///
/// Firing is fire-and-forget with respect to consumption: the trigger
/// returns once every job is on the channel, without waiting for delivery.
pub struct NewsletterTrigger {
    pool: PgPool,
    redis: ConnectionManager,
    max_attempts: u32,
    /// Weekly firings should never overlap; this guard turns an accidental
    /// re-entrant firing into a logged skip.
    running: AtomicBool,
}

impl NewsletterTrigger {
    pub fn new(pool: PgPool, redis: ConnectionManager, max_attempts: u32) -> Self {
        Self {
            pool,
            redis,
            max_attempts,
            running: AtomicBool::new(false),
        }
    }

    /// Fire once: one job per currently-subscribed recipient.
    ///
    /// Returns the number of jobs enqueued. Zero subscribers is a normal
    /// outcome, not an error. A firing that overlaps a still-running one is
    /// skipped and also reports zero.
    pub async fn fire(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Previous newsletter firing still in progress; skipping");
            return Ok(0);
        }

        let result = self.fan_out(now).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn fan_out(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let subscribers = find_subscribed_recipients(&self.pool).await?;

        if subscribers.is_empty() {
            tracing::info!("No newsletter subscribers; nothing to enqueue");
            return Ok(0);
        }

        let mut queue = NewsletterQueue::new(self.redis.clone(), self.max_attempts);
        let mut enqueued = 0u64;
        for subscriber in &subscribers {
            let job = NewsletterJob::new(&subscriber.email, now);
            queue.enqueue(&job).await?;
            enqueued += 1;
        }

        tracing::info!(enqueued, "Newsletter jobs enqueued");
        Ok(enqueued)
    }
}
