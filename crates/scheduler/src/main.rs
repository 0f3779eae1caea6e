//! Newsletter scheduler binary entrypoint.

use chrono::Utc;

use gamedex_common::config::AppConfig;
use gamedex_common::db;
use gamedex_common::redis_pool::create_redis_pool;

use gamedex_scheduler::schedule::WeeklySchedule;
use gamedex_scheduler::trigger::NewsletterTrigger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamedex_scheduler=info,gamedex_catalog=debug".into()),
        )
        .json()
        .init();

    tracing::info!("GameDex newsletter scheduler starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Connect to Redis
    let redis = create_redis_pool(&config.redis_url).await?;

    let schedule = WeeklySchedule::from_config(&config);
    let trigger = NewsletterTrigger::new(pool, redis, config.queue_max_attempts);

    tracing::info!(
        weekday = %schedule.weekday,
        hour = schedule.hour,
        minute = schedule.minute,
        "Newsletter schedule configured"
    );

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = run_loop(&schedule, &trigger) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Scheduler loop exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("GameDex newsletter scheduler stopped.");
    Ok(())
}

/// Sleep until each fire instant, then fan out. Trigger failures are logged
/// and the loop keeps going; the next week's firing still happens.
async fn run_loop(schedule: &WeeklySchedule, trigger: &NewsletterTrigger) -> anyhow::Result<()> {
    loop {
        let now = Utc::now();
        let next = schedule.next_fire_after(now);
        let wait = (next - now).to_std().unwrap_or_default();

        tracing::info!(next_fire = %next, "Sleeping until next newsletter firing");
        tokio::time::sleep(wait).await;

        match trigger.fire(Utc::now()).await {
            Ok(enqueued) => tracing::info!(enqueued, "Newsletter trigger fired"),
            Err(e) => tracing::error!(error = %e, "Newsletter trigger failed"),
        }
    }
}
