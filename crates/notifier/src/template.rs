//! Newsletter HTML rendering.

use askama::Template;

use gamedex_common::error::AppError;
use gamedex_common::types::UpcomingRelease;

/// Subject line for the weekly newsletter.
pub const NEWSLETTER_SUBJECT: &str = "Discover this week's video game releases!";

/// Rendering context for the weekly newsletter email.
#[derive(Template)]
#[template(path = "newsletter.html")]
pub struct NewsletterTemplate<'a> {
    pub recipient: &'a str,
    pub releases: &'a [UpcomingRelease],
}

/// Render the newsletter for one recipient. Returns (subject, html_body).
pub fn render_newsletter(
    recipient: &str,
    releases: &[UpcomingRelease],
) -> Result<(String, String), AppError> {
    let template = NewsletterTemplate {
        recipient,
        releases,
    };
    let html = template
        .render()
        .map_err(|e| AppError::Render(e.to_string()))?;
    Ok((NEWSLETTER_SUBJECT.to_string(), html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn release(title: &str, category: Option<&str>) -> UpcomingRelease {
        UpcomingRelease {
            title: title.to_string(),
            release_date: Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap(),
            description: format!("{} is releasing soon.", title),
            editor: "Nintendo".to_string(),
            category: category.map(|c| c.to_string()),
        }
    }

    #[test]
    fn test_render_includes_every_release() {
        let releases = vec![
            release("Hyrule Chronicles", Some("RPG")),
            release("Kart Stars", None),
        ];

        let (subject, html) = render_newsletter("player@example.com", &releases).unwrap();

        assert_eq!(subject, NEWSLETTER_SUBJECT);
        assert!(html.contains("player@example.com"));
        assert!(html.contains("Hyrule Chronicles"));
        assert!(html.contains("Kart Stars"));
        assert!(html.contains("Nintendo"));
        assert!(html.contains("RPG"));
        assert!(html.contains("August"));
    }

    #[test]
    fn test_render_escapes_html_in_titles() {
        let releases = vec![release("<script>alert('x')</script>", None)];

        let (_, html) = render_newsletter("player@example.com", &releases).unwrap();
        assert!(!html.contains("<script>"));
    }
}
