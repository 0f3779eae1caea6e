//! Newsletter dispatch worker binary entrypoint.

use std::sync::Arc;

use gamedex_common::config::AppConfig;
use gamedex_common::db;
use gamedex_common::redis_pool::create_redis_pool;

use gamedex_notifier::mailer::{MailTransport, SmtpMailer};
use gamedex_notifier::queue::NewsletterQueue;
use gamedex_notifier::worker::WorkerPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamedex_notifier=info,gamedex_catalog=debug".into()),
        )
        .json()
        .init();

    tracing::info!("GameDex newsletter worker starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to database and Redis
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    let redis = create_redis_pool(&config.redis_url).await?;

    // Requeue anything a previous run left in flight
    let mut queue = NewsletterQueue::new(redis.clone(), config.queue_max_attempts);
    let recovered = queue.recover_processing().await?;
    if recovered > 0 {
        tracing::info!(recovered, "Requeued orphaned in-flight jobs");
    }

    let mailer: Arc<dyn MailTransport> = Arc::new(SmtpMailer::from_config(&config)?);

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = WorkerPool::run(&config, pool, redis, mailer) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker pool exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("GameDex newsletter worker stopped.");
    Ok(())
}
