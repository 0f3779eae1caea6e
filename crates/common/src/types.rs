use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A video game in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub description: String,
    pub editor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A game publisher.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Editor {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog category (genre).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A newsletter recipient, projected from the users table.
///
/// Read-only for the pipeline; the opt-in flag is owned by user management.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscriber {
    pub email: String,
    pub subscribed: bool,
}

/// A catalog row whose release date falls inside the upcoming window,
/// joined with its editor and category names for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UpcomingRelease {
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub description: String,
    pub editor: String,
    pub category: Option<String>,
}

/// One newsletter delivery job carried by the message channel.
///
/// Transient: lives only on the queue, one per subscriber per trigger firing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterJob {
    pub recipient_email: String,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl NewsletterJob {
    pub fn new(recipient_email: impl Into<String>, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            enqueued_at,
            attempts: 0,
        }
    }
}
