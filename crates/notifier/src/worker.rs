//! Dispatch workers — consume newsletter jobs and deliver conditionally.
//!
//! Each worker pulls one job at a time and handles it to completion before
//! pulling the next. Workers share nothing mutable; ordering across
//! recipients is neither guaranteed nor required. The worker performs no
//! retries of its own: failures are reported to the channel, whose
//! redelivery policy owns retry and dead-lettering.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use sqlx::PgPool;

use gamedex_catalog::releases::{find_releases_between, upcoming_window};
use gamedex_common::config::AppConfig;
use gamedex_common::error::AppError;
use gamedex_common::types::NewsletterJob;

use crate::mailer::MailTransport;
use crate::queue::NewsletterQueue;
use crate::template::render_newsletter;

/// What handling one job amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A newsletter covering `releases` upcoming titles was delivered.
    Sent { releases: usize },
    /// Nothing falls inside the upcoming window; no email, no error.
    NoReleases,
}

/// A single newsletter dispatch worker.
pub struct DispatchWorker {
    worker_id: usize,
    pool: PgPool,
    queue: NewsletterQueue,
    mailer: Arc<dyn MailTransport>,
    poll_timeout: Duration,
}

impl DispatchWorker {
    pub fn new(
        worker_id: usize,
        pool: PgPool,
        queue: NewsletterQueue,
        mailer: Arc<dyn MailTransport>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            worker_id,
            pool,
            queue,
            mailer,
            poll_timeout,
        }
    }

    /// Drain the channel forever. Channel errors are logged and retried
    /// after a pause rather than crashing the worker.
    pub async fn run(&mut self) {
        tracing::info!(worker_id = self.worker_id, "Dispatch worker started");

        loop {
            let delivery = match self.queue.dequeue(self.poll_timeout).await {
                Ok(Some(delivery)) => delivery,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(
                        worker_id = self.worker_id,
                        error = %e,
                        "Failed to dequeue; backing off"
                    );
                    tokio::time::sleep(self.poll_timeout).await;
                    continue;
                }
            };

            // "Now" is evaluated per job, so late-processed messages still
            // see a genuinely current upcoming window.
            let outcome =
                Self::handle(&self.pool, self.mailer.as_ref(), &delivery.job, Utc::now()).await;

            let result = match outcome {
                Ok(DispatchOutcome::Sent { releases }) => {
                    tracing::info!(
                        worker_id = self.worker_id,
                        recipient = %delivery.job.recipient_email,
                        releases,
                        "Newsletter dispatched"
                    );
                    self.queue.ack(&delivery).await
                }
                Ok(DispatchOutcome::NoReleases) => {
                    tracing::debug!(
                        worker_id = self.worker_id,
                        recipient = %delivery.job.recipient_email,
                        "No upcoming releases; nothing sent"
                    );
                    self.queue.ack(&delivery).await
                }
                Err(e) => {
                    tracing::error!(
                        worker_id = self.worker_id,
                        recipient = %delivery.job.recipient_email,
                        error = %e,
                        "Newsletter dispatch failed"
                    );
                    self.queue.nack(&delivery).await.map(|_| ())
                }
            };

            if let Err(e) = result {
                tracing::error!(
                    worker_id = self.worker_id,
                    error = %e,
                    "Failed to settle job with the channel"
                );
            }
        }
    }

    /// Handle one job: select the upcoming window, and only if it is
    /// non-empty render and deliver to the job's recipient.
    ///
    /// Safe to re-invoke with the same job (redelivery at most re-sends an
    /// identical newsletter).
    pub async fn handle(
        pool: &PgPool,
        mailer: &dyn MailTransport,
        job: &NewsletterJob,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, AppError> {
        let (from, to) = upcoming_window(now);
        let releases = find_releases_between(pool, from, to).await?;

        if releases.is_empty() {
            return Ok(DispatchOutcome::NoReleases);
        }

        let (subject, html) = render_newsletter(&job.recipient_email, &releases)?;
        mailer.send(&job.recipient_email, &subject, &html).await?;

        Ok(DispatchOutcome::Sent {
            releases: releases.len(),
        })
    }
}

/// Spawn the configured number of independent dispatch workers.
pub struct WorkerPool;

impl WorkerPool {
    /// Run `config.worker_count` workers until one of them panics. Intended
    /// to be raced against a shutdown signal by the binary.
    pub async fn run(
        config: &AppConfig,
        pool: PgPool,
        redis: ConnectionManager,
        mailer: Arc<dyn MailTransport>,
    ) -> anyhow::Result<()> {
        let poll_timeout = Duration::from_secs(config.queue_poll_timeout_secs);
        let count = config.worker_count.max(1);

        let mut workers = tokio::task::JoinSet::new();
        for worker_id in 0..count {
            let queue = NewsletterQueue::new(redis.clone(), config.queue_max_attempts);
            let mut worker = DispatchWorker::new(
                worker_id,
                pool.clone(),
                queue,
                mailer.clone(),
                poll_timeout,
            );
            workers.spawn(async move { worker.run().await });
        }

        tracing::info!(count, "Worker pool started");

        while let Some(joined) = workers.join_next().await {
            joined?;
        }
        Ok(())
    }
}
