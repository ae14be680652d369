//! Email delivery channel via SMTP.
//!
//! [`EmailChannel`] renders the HTML reminder for a notification record and
//! sends it through a [`Mailer`]. The production mailer wraps the `lettre`
//! async SMTP transport; configuration is loaded from environment variables,
//! and if `SMTP_HOST` is not set [`EmailConfig::from_env`] returns `None`
//! and the channel skips every record.

use std::sync::Arc;

use cadence_db::models::notification::Notification;
use cadence_db::repositories::UserRepo;
use cadence_db::DbPool;

use crate::outcome::DeliveryOutcome;

/// Subject line for scheduled exercise reminders.
const REMINDER_SUBJECT: &str = "Daily exercise reminder";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@cadence.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `SMTP_HOST`     | yes      | —                        |
    /// | `SMTP_PORT`     | no       | `587`                    |
    /// | `SMTP_FROM`     | no       | `noreply@cadence.local`  |
    /// | `SMTP_USER`     | no       | —                        |
    /// | `SMTP_PASSWORD` | no       | —                        |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// The SMTP wire seam.
///
/// Production uses [`SmtpMailer`]; tests substitute a recording or failing
/// implementation.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send one HTML email.
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError>;
}

/// Sends email via lettre's async SMTP transport.
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    /// Create a mailer with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to, subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EmailChannel
// ---------------------------------------------------------------------------

/// Delivers scheduled notifications by email.
pub struct EmailChannel {
    pool: DbPool,
    mailer: Option<Arc<dyn Mailer>>,
    client_url: String,
}

impl EmailChannel {
    /// Create a channel. `mailer` is `None` when SMTP is not configured,
    /// in which case every send is a skip.
    pub fn new(pool: DbPool, mailer: Option<Arc<dyn Mailer>>, client_url: String) -> Self {
        Self {
            pool,
            mailer,
            client_url,
        }
    }

    /// Attempt email delivery for one notification record.
    ///
    /// Failures are logged and absorbed; nothing propagates to the dispatch
    /// loop.
    pub async fn send(&self, notification: &Notification) -> DeliveryOutcome {
        let Some(mailer) = &self.mailer else {
            return DeliveryOutcome::Skipped("email not configured");
        };

        let user = match UserRepo::get(&self.pool, notification.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return DeliveryOutcome::Skipped("unknown user"),
            Err(e) => {
                tracing::error!(
                    notification_id = notification.id,
                    error = %e,
                    "Email delivery: failed to load user"
                );
                return DeliveryOutcome::Failed(e.to_string());
            }
        };

        let link = format!("{}/exercises/{}", self.client_url, notification.exercise_id);
        let html = render_reminder(&user.name, &notification.message, &link);

        match mailer.send_html(&user.email, REMINDER_SUBJECT, &html).await {
            Ok(()) => {
                tracing::debug!(
                    notification_id = notification.id,
                    user_id = user.id,
                    "Reminder email delivered"
                );
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::error!(
                    notification_id = notification.id,
                    user_id = user.id,
                    error = %e,
                    "Email delivery failed"
                );
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Render the scheduled-reminder HTML body.
fn render_reminder(name: &str, message: &str, link: &str) -> String {
    format!(
        r#"<div style="font-family: Helvetica, Arial, sans-serif;">
  <h2>Hello {name},</h2>
  <p>{message}</p>
  <a href="{link}" style="background: #4F46E5; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; display: inline-block; margin-top: 10px;">
    Open your exercise
  </a>
</div>"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn reminder_body_contains_greeting_message_and_link() {
        let html = render_reminder("Ada", "Time to journal", "https://study.example/exercises/3");

        assert!(html.contains("Hello Ada,"));
        assert!(html.contains("Time to journal"));
        assert!(html.contains(r#"href="https://study.example/exercises/3""#));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn email_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
