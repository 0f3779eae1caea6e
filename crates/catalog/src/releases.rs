//! Upcoming-release selection.
//!
//! The newsletter shows releases due within the next seven days. The window
//! is inclusive on both bounds and the evaluation instant is always passed
//! in explicitly, so a late-processed job sees genuinely current content and
//! tests can pin the clock.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use gamedex_common::error::AppError;
use gamedex_common::types::UpcomingRelease;

/// Length of the upcoming window in days.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// The inclusive `[now, now + 7 days]` window.
pub fn upcoming_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(UPCOMING_WINDOW_DAYS))
}

/// All releases with `from <= release_date <= to`, ordered by release date
/// ascending with identifier order breaking ties.
pub async fn find_releases_between(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<UpcomingRelease>, AppError> {
    let releases: Vec<UpcomingRelease> = sqlx::query_as(
        r#"
        SELECT g.title, g.release_date, g.description, e.name AS editor, c.name AS category
        FROM games g
        JOIN editors e ON g.editor_id = e.id
        LEFT JOIN categories c ON g.category_id = c.id
        WHERE g.release_date >= $1 AND g.release_date <= $2
        ORDER BY g.release_date ASC, g.id ASC
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(releases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_spans_exactly_seven_days() {
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 8, 30, 0).unwrap();
        let (from, to) = upcoming_window(now);
        assert_eq!(from, now);
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 8, 10, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_window_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 1, 28, 0, 0, 0).unwrap();
        let (_, to) = upcoming_window(now);
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 2, 4, 0, 0, 0).unwrap());
    }
}
