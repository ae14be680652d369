//! Due-notification dispatch loop.
//!
//! [`DispatchScanner`] runs once per minute, selects unsent records whose
//! schedule time falls within the next five minutes, and routes each through
//! both delivery channels. The record's `sent_at` is stamped via an atomic
//! set-if-null after each delivered outcome, so a record is selected by at
//! most one future tick regardless of which channel succeeded.

use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use cadence_core::types::Timestamp;
use cadence_db::repositories::NotificationRepo;
use cadence_db::DbPool;

use crate::channels::email::EmailChannel;
use crate::channels::push::PushChannel;

/// How often the scan runs.
const SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// Look-ahead window for due records, in minutes.
const DUE_WINDOW_MINUTES: i64 = 5;

/// Counters from one scan tick, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Records matched by the due-window query.
    pub due: usize,
    /// Records the push channel delivered.
    pub push_delivered: usize,
    /// Records the email channel delivered.
    pub email_delivered: usize,
}

/// Background service that dispatches due notifications.
pub struct DispatchScanner {
    pool: DbPool,
    push: PushChannel,
    email: EmailChannel,
}

impl DispatchScanner {
    /// Create a scanner over the given pool and channels.
    pub fn new(pool: DbPool, push: PushChannel, email: EmailChannel) -> Self {
        Self { pool, push, email }
    }

    /// Run the scan loop until `cancel` is triggered.
    ///
    /// Ticks are serialized: the next interval fire is not processed until
    /// the current tick's awaits complete. A repository failure abandons
    /// only the current tick; the next tick retries the same query since no
    /// `sent_at` was written.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = SCAN_INTERVAL.as_secs(),
            window_minutes = DUE_WINDOW_MINUTES,
            "Dispatch scanner started"
        );

        let mut interval = tokio::time::interval(SCAN_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dispatch scanner stopping");
                    break;
                }
                _ = interval.tick() => {
                    let now = Local::now().naive_local();
                    match self.tick(now).await {
                        Ok(summary) if summary.due > 0 => {
                            tracing::info!(
                                due = summary.due,
                                push_delivered = summary.push_delivered,
                                email_delivered = summary.email_delivered,
                                "Dispatch tick complete"
                            );
                        }
                        Ok(_) => {
                            tracing::debug!("Dispatch tick: nothing due");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Dispatch tick abandoned");
                        }
                    }
                }
            }
        }
    }

    /// Process one scan tick at the given wall-clock time.
    ///
    /// For each due record, push delivery is attempted first, then email,
    /// independently of each other's outcome. A failed channel never blocks
    /// the other and never reverts the record.
    pub async fn tick(&self, now: Timestamp) -> Result<TickSummary, sqlx::Error> {
        let window_end = now + chrono::Duration::minutes(DUE_WINDOW_MINUTES);
        let due = NotificationRepo::find_due(&self.pool, now, window_end).await?;

        let mut summary = TickSummary {
            due: due.len(),
            ..TickSummary::default()
        };

        for notification in &due {
            let push_outcome = self.push.send(notification).await;
            if push_outcome.is_delivered() {
                summary.push_delivered += 1;
                NotificationRepo::mark_sent(&self.pool, notification.id, now).await?;
            }

            let email_outcome = self.email.send(notification).await;
            if email_outcome.is_delivered() {
                summary.email_delivered += 1;
                NotificationRepo::mark_sent(&self.pool, notification.id, now).await?;
            }

            tracing::debug!(
                notification_id = notification.id,
                ?push_outcome,
                ?email_outcome,
                "Dispatched notification"
            );
        }

        Ok(summary)
    }
}
