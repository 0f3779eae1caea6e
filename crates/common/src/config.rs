use chrono::Weekday;
use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string
    pub redis_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Time-to-live for cached catalog pages in seconds (default: 3600, 0 = no expiry)
    pub cache_ttl_seconds: u64,

    /// Day of week the newsletter trigger fires (default: Monday)
    pub newsletter_weekday: Weekday,

    /// Hour of day the newsletter trigger fires, UTC (default: 8)
    pub newsletter_hour: u32,

    /// Minute of hour the newsletter trigger fires (default: 30)
    pub newsletter_minute: u32,

    /// Number of concurrent dispatch workers (default: 4)
    pub worker_count: usize,

    /// Delivery attempts before a job is dead-lettered (default: 5)
    pub queue_max_attempts: u32,

    /// Blocking dequeue timeout in seconds (default: 5)
    pub queue_poll_timeout_secs: u64,

    /// SMTP relay host; unset runs the mailer in no-op mode
    pub smtp_host: Option<String>,

    /// SMTP relay port (default: 587)
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: Option<String>,

    /// SMTP password
    pub smtp_password: Option<String>,

    /// Sender mailbox for outgoing newsletters
    pub smtp_from: String,

    /// Upper bound on a single mail send in seconds (default: 10)
    pub mail_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            cache_ttl_seconds: std::env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CACHE_TTL_SECONDS must be a valid u64"))?,
            newsletter_weekday: std::env::var("NEWSLETTER_WEEKDAY")
                .unwrap_or_else(|_| "monday".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("NEWSLETTER_WEEKDAY must be a day of week, e.g. 'monday'")
                })?,
            newsletter_hour: parse_bounded("NEWSLETTER_HOUR", "8", 23)?,
            newsletter_minute: parse_bounded("NEWSLETTER_MINUTE", "30", 59)?,
            worker_count: std::env::var("WORKER_COUNT")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("WORKER_COUNT must be a valid usize"))?,
            queue_max_attempts: std::env::var("QUEUE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("QUEUE_MAX_ATTEMPTS must be a valid u32"))?,
            queue_poll_timeout_secs: std::env::var("QUEUE_POLL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("QUEUE_POLL_TIMEOUT_SECS must be a valid u64"))?,
            smtp_host: std::env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty()),
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid u16"))?,
            smtp_username: std::env::var("SMTP_USERNAME").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            smtp_from: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| "Gaming News <noreply@gamedex.dev>".to_string()),
            mail_timeout_secs: std::env::var("MAIL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAIL_TIMEOUT_SECS must be a valid u64"))?,
        })
    }
}

fn parse_bounded(var: &str, default: &str, max: u32) -> anyhow::Result<u32> {
    let value: u32 = std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| anyhow::anyhow!("{var} must be a valid u32"))?;
    if value > max {
        anyhow::bail!("{var} must be at most {max}, got {value}");
    }
    Ok(value)
}
