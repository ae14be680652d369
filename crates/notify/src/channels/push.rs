//! Web Push delivery channel.
//!
//! [`PushChannel`] resolves the user's stored subscription descriptor,
//! builds the notification payload, and hands it to a [`PushTransport`].
//! A provider response indicating the endpoint is permanently gone (HTTP
//! 410) triggers cleanup of the stored subscription so future scans skip
//! the user.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cadence_db::models::notification::Notification;
use cadence_db::repositories::UserRepo;
use cadence_db::DbPool;

use crate::outcome::DeliveryOutcome;

/// Notification title shown by the browser.
const PUSH_TITLE: &str = "Cadence Study";

/// Icon path served by the participant web app.
const PUSH_ICON: &str = "/icon-192x192.png";

/// Badge path served by the participant web app.
const PUSH_BADGE: &str = "/badge-72x72.png";

/// HTTP request timeout for a single push attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push provider returned a non-2xx status code.
    #[error("Push endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// The push provider reported the endpoint permanently invalid
    /// (HTTP 410). The stored subscription must be discarded.
    #[error("Push endpoint is permanently gone")]
    Gone,
}

// ---------------------------------------------------------------------------
// Subscription descriptor
// ---------------------------------------------------------------------------

/// A Web Push subscription as stored on the user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Provider-issued endpoint URL.
    pub endpoint: String,
    /// Client public key for payload encryption.
    pub p256dh: String,
    /// Client auth secret.
    pub auth: String,
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// The push wire seam.
///
/// Production uses [`HttpPushTransport`]; tests substitute a recording or
/// failing implementation.
#[async_trait::async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver a JSON payload to one subscription.
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &serde_json::Value,
    ) -> Result<(), PushError>;
}

/// Sends push payloads to the subscription endpoint via HTTP POST.
pub struct HttpPushTransport {
    client: reqwest::Client,
}

impl HttpPushTransport {
    /// Create a transport with a pre-configured HTTP client.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PushTransport for HttpPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &serde_json::Value,
    ) -> Result<(), PushError> {
        let response = self
            .client
            .post(&subscription.endpoint)
            .json(payload)
            .send()
            .await?;

        match response.status().as_u16() {
            410 => Err(PushError::Gone),
            status if !response.status().is_success() => Err(PushError::HttpStatus(status)),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// PushChannel
// ---------------------------------------------------------------------------

/// Delivers scheduled notifications over Web Push.
pub struct PushChannel {
    pool: DbPool,
    transport: Arc<dyn PushTransport>,
}

impl PushChannel {
    /// Create a channel over the given pool and transport.
    pub fn new(pool: DbPool, transport: Arc<dyn PushTransport>) -> Self {
        Self { pool, transport }
    }

    /// Attempt push delivery for one notification record.
    ///
    /// A user without a stored subscription is a no-op ([`Skipped`]), not an
    /// error. A permanently gone endpoint clears the stored subscription —
    /// the one cross-entity mutation this channel performs. All other
    /// failures are logged and absorbed.
    ///
    /// [`Skipped`]: DeliveryOutcome::Skipped
    pub async fn send(&self, notification: &Notification) -> DeliveryOutcome {
        let user = match UserRepo::get(&self.pool, notification.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return DeliveryOutcome::Skipped("unknown user"),
            Err(e) => {
                tracing::error!(
                    notification_id = notification.id,
                    error = %e,
                    "Push delivery: failed to load user"
                );
                return DeliveryOutcome::Failed(e.to_string());
            }
        };

        let Some(raw) = user.push_subscription else {
            return DeliveryOutcome::Skipped("no push subscription");
        };

        let subscription: PushSubscription = match serde_json::from_value(raw) {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(
                    user_id = user.id,
                    error = %e,
                    "Push delivery: stored subscription is malformed"
                );
                return DeliveryOutcome::Skipped("malformed push subscription");
            }
        };

        let payload = build_payload(notification);

        match self.transport.send(&subscription, &payload).await {
            Ok(()) => {
                tracing::debug!(
                    notification_id = notification.id,
                    user_id = user.id,
                    "Push notification delivered"
                );
                DeliveryOutcome::Delivered
            }
            Err(PushError::Gone) => {
                tracing::info!(
                    user_id = user.id,
                    "Push endpoint gone, clearing stored subscription"
                );
                if let Err(e) = UserRepo::clear_push_subscription(&self.pool, user.id).await {
                    tracing::error!(user_id = user.id, error = %e, "Failed to clear subscription");
                }
                DeliveryOutcome::Failed("subscription gone".to_string())
            }
            Err(e) => {
                tracing::error!(
                    notification_id = notification.id,
                    user_id = user.id,
                    error = %e,
                    "Push delivery failed"
                );
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Assemble the browser-facing payload for one record.
fn build_payload(notification: &Notification) -> serde_json::Value {
    serde_json::json!({
        "title": PUSH_TITLE,
        "body": notification.message,
        "icon": PUSH_ICON,
        "badge": PUSH_BADGE,
        "data": {
            "url": format!("/exercises/{}", notification.exercise_id),
            "notificationId": notification.id,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_notification() -> Notification {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Notification {
            id: 7,
            user_id: 1,
            exercise_id: 42,
            kind: "morning".to_string(),
            message: "Time for your daily exercise".to_string(),
            scheduled_for: ts,
            sent_at: None,
            read_at: None,
            clicked: false,
            created_at: ts,
        }
    }

    #[test]
    fn payload_carries_deep_link_and_record_id() {
        let payload = build_payload(&sample_notification());

        assert_eq!(payload["title"], PUSH_TITLE);
        assert_eq!(payload["body"], "Time for your daily exercise");
        assert_eq!(payload["data"]["url"], "/exercises/42");
        assert_eq!(payload["data"]["notificationId"], 7);
    }

    #[test]
    fn subscription_deserializes_from_stored_json() {
        let subscription: PushSubscription = serde_json::from_value(serde_json::json!({
            "endpoint": "https://push.example/abc",
            "p256dh": "key",
            "auth": "secret",
        }))
        .unwrap();

        assert_eq!(subscription.endpoint, "https://push.example/abc");
    }

    #[test]
    fn gone_error_display() {
        assert_eq!(PushError::Gone.to_string(), "Push endpoint is permanently gone");
    }

    #[test]
    fn http_status_error_display() {
        assert_eq!(PushError::HttpStatus(502).to_string(), "Push endpoint returned HTTP 502");
    }
}
