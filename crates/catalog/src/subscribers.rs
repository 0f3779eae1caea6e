//! Subscriber enumeration for the newsletter fan-out.

use sqlx::PgPool;

use gamedex_common::error::AppError;
use gamedex_common::types::Subscriber;

/// All recipients currently opted into the newsletter.
///
/// Read-only projection: the opt-in flag is mutated by user management, not
/// by the pipeline. An empty result is a normal outcome.
pub async fn find_subscribed_recipients(pool: &PgPool) -> Result<Vec<Subscriber>, AppError> {
    let subscribers: Vec<Subscriber> = sqlx::query_as(
        r#"
        SELECT email, newsletter_opt_in AS subscribed
        FROM users
        WHERE newsletter_opt_in = true
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    tracing::debug!(count = subscribers.len(), "Enumerated newsletter subscribers");

    Ok(subscribers)
}
