//! Redis-backed newsletter job channel.
//!
//! A reliable-queue over Redis lists: `enqueue` pushes onto the jobs list,
//! `dequeue` moves one payload atomically into the processing list
//! (`BLMOVE`), so a worker crash leaves the payload recoverable instead of
//! lost. `ack` removes it after successful handling; `nack` requeues it with
//! an incremented attempt count, or parks it on the dead-letter list once
//! the retry budget is spent. Delivery is at-least-once.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use gamedex_common::error::AppError;
use gamedex_common::types::NewsletterJob;

/// Pending newsletter jobs, one JSON payload per subscriber.
pub const JOBS_KEY: &str = "newsletter:jobs";

/// Jobs currently held by a worker.
pub const PROCESSING_KEY: &str = "newsletter:processing";

/// Jobs that exhausted their delivery attempts.
pub const DEAD_LETTER_KEY: &str = "newsletter:dead";

/// A dequeued job together with its exact wire payload.
///
/// The raw payload is what `ack`/`nack` remove from the processing list, so
/// it must not be altered between dequeue and acknowledgement.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub job: NewsletterJob,
    raw: String,
}

/// Producer/consumer handle for the newsletter channel.
pub struct NewsletterQueue {
    redis: ConnectionManager,
    max_attempts: u32,
}

impl NewsletterQueue {
    pub fn new(redis: ConnectionManager, max_attempts: u32) -> Self {
        Self {
            redis,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Push one job onto the channel. Fire-and-forget with respect to
    /// consumption: returns as soon as Redis accepts the payload.
    pub async fn enqueue(&mut self, job: &NewsletterJob) -> Result<(), AppError> {
        let payload = serde_json::to_string(job)?;
        self.redis.lpush::<_, _, ()>(JOBS_KEY, &payload).await?;

        tracing::debug!(recipient = %job.recipient_email, "Newsletter job enqueued");
        Ok(())
    }

    /// Block up to `timeout` for the next job, moving it onto the processing
    /// list. Returns `None` on timeout.
    ///
    /// A payload that fails to parse is parked on the dead-letter list
    /// instead of poisoning the processing list forever.
    pub async fn dequeue(&mut self, timeout: Duration) -> Result<Option<Delivery>, AppError> {
        let raw: Option<String> = redis::cmd("BLMOVE")
            .arg(JOBS_KEY)
            .arg(PROCESSING_KEY)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(timeout.as_secs_f64())
            .query_async(&mut self.redis)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<NewsletterJob>(&raw) {
            Ok(job) => Ok(Some(Delivery { job, raw })),
            Err(e) => {
                tracing::warn!(error = %e, "Dead-lettering malformed job payload");
                self.redis
                    .lrem::<_, _, ()>(PROCESSING_KEY, 1, &raw)
                    .await?;
                self.redis.lpush::<_, _, ()>(DEAD_LETTER_KEY, &raw).await?;
                Ok(None)
            }
        }
    }

    /// Acknowledge a successfully handled job, removing it from the
    /// processing list.
    pub async fn ack(&mut self, delivery: &Delivery) -> Result<(), AppError> {
        self.redis
            .lrem::<_, _, ()>(PROCESSING_KEY, 1, &delivery.raw)
            .await?;
        Ok(())
    }

    /// Report a failed job. Requeues it with an incremented attempt count,
    /// or dead-letters it once `max_attempts` is reached. Returns true if
    /// the job was requeued for another attempt.
    pub async fn nack(&mut self, delivery: &Delivery) -> Result<bool, AppError> {
        self.redis
            .lrem::<_, _, ()>(PROCESSING_KEY, 1, &delivery.raw)
            .await?;

        let mut job = delivery.job.clone();
        job.attempts += 1;
        let payload = serde_json::to_string(&job)?;

        if job.attempts >= self.max_attempts {
            self.redis.lpush::<_, _, ()>(DEAD_LETTER_KEY, &payload).await?;
            tracing::warn!(
                recipient = %job.recipient_email,
                attempts = job.attempts,
                "Newsletter job dead-lettered"
            );
            Ok(false)
        } else {
            self.redis.lpush::<_, _, ()>(JOBS_KEY, &payload).await?;
            tracing::info!(
                recipient = %job.recipient_email,
                attempts = job.attempts,
                "Newsletter job requeued for retry"
            );
            Ok(true)
        }
    }

    /// Move any orphaned in-flight payloads back onto the jobs list.
    /// Called at worker startup to recover from a previous crash.
    pub async fn recover_processing(&mut self) -> Result<u64, AppError> {
        let mut recovered = 0u64;
        loop {
            let moved: Option<String> = redis::cmd("LMOVE")
                .arg(PROCESSING_KEY)
                .arg(JOBS_KEY)
                .arg("RIGHT")
                .arg("LEFT")
                .query_async(&mut self.redis)
                .await?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }
        Ok(recovered)
    }

    /// Number of jobs waiting on the channel.
    pub async fn len(&mut self) -> Result<u64, AppError> {
        let len: u64 = self.redis.llen(JOBS_KEY).await?;
        Ok(len)
    }

    /// Number of dead-lettered jobs.
    pub async fn dead_letter_len(&mut self) -> Result<u64, AppError> {
        let len: u64 = self.redis.llen(DEAD_LETTER_KEY).await?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use gamedex_common::types::NewsletterJob;

    #[test]
    fn test_job_payload_round_trip() {
        let enqueued_at = Utc.with_ymd_and_hms(2026, 8, 3, 8, 30, 0).unwrap();
        let job = NewsletterJob::new("player@example.com", enqueued_at);

        let payload = serde_json::to_string(&job).unwrap();
        assert!(payload.contains("\"recipient_email\":\"player@example.com\""));

        let parsed: NewsletterJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed.recipient_email, job.recipient_email);
        assert_eq!(parsed.enqueued_at, enqueued_at);
        assert_eq!(parsed.attempts, 0);
    }

    #[test]
    fn test_attempts_default_when_absent() {
        // Payloads written before the retry counter existed must still parse.
        let parsed: NewsletterJob = serde_json::from_str(
            r#"{"recipient_email":"player@example.com","enqueued_at":"2026-08-03T08:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.attempts, 0);
    }
}
