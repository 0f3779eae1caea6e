//! Outbound mail transport.
//!
//! The worker talks to a [`MailTransport`] trait object so tests can record
//! sends without a relay. The production implementation is lettre over SMTP,
//! with a no-op mode when no relay is configured (useful for development)
//! and a per-send timeout: a send that exceeds it counts as a delivery
//! failure, never as success.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use gamedex_common::config::AppConfig;
use gamedex_common::error::AppError;

/// Delivery sink for rendered newsletters.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

/// SMTP mail transport backed by lettre.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    timeout: Duration,
}

impl SmtpMailer {
    /// Build the mailer from configuration.
    ///
    /// Without an SMTP host the mailer operates in no-op mode (logs only).
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = match &config.smtp_host {
            None => {
                tracing::warn!("SMTP host not configured; mailer will operate in no-op mode");
                None
            }
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| {
                        AppError::Config(format!("Failed to configure SMTP transport: {}", e))
                    })?
                    .port(config.smtp_port);

                if let (Some(username), Some(password)) =
                    (&config.smtp_username, &config.smtp_password)
                {
                    builder =
                        builder.credentials(Credentials::new(username.clone(), password.clone()));
                }

                Some(builder.build())
            }
        };

        Ok(Self {
            transport,
            from,
            timeout: Duration::from_secs(config.mail_timeout_secs),
        })
    }

    /// Check if a real SMTP transport is configured.
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let Some(transport) = &self.transport else {
            tracing::info!(to, subject, "Mailer in no-op mode; skipping send");
            return Ok(());
        };

        let to_mailbox = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Mail(format!("Invalid recipient address '{}': {}", to, e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(header::ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::Mail(format!("Failed to build email message: {}", e)))?;

        match tokio::time::timeout(self.timeout, transport.send(email)).await {
            Err(_) => Err(AppError::Mail(format!(
                "Send to {} timed out after {}s",
                to,
                self.timeout.as_secs()
            ))),
            Ok(Err(e)) => Err(AppError::Mail(format!("Failed to send email: {}", e))),
            Ok(Ok(_)) => {
                tracing::info!(to, subject, "Newsletter delivered");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_config() -> AppConfig {
        AppConfig {
            database_url: "unused".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            db_max_connections: 5,
            cache_ttl_seconds: 3600,
            newsletter_weekday: chrono::Weekday::Mon,
            newsletter_hour: 8,
            newsletter_minute: 30,
            worker_count: 1,
            queue_max_attempts: 5,
            queue_poll_timeout_secs: 5,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "Gaming News <noreply@gamedex.dev>".to_string(),
            mail_timeout_secs: 10,
        }
    }

    #[tokio::test]
    async fn test_noop_mode_send_succeeds() {
        let mailer = SmtpMailer::from_config(&noop_config()).unwrap();
        assert!(!mailer.is_enabled());

        mailer
            .send("player@example.com", "Subject", "<p>Body</p>")
            .await
            .unwrap();
    }

    #[test]
    fn test_invalid_from_address_is_rejected() {
        let mut config = noop_config();
        config.smtp_from = "not an address".to_string();

        assert!(SmtpMailer::from_config(&config).is_err());
    }
}
