//! Daily reminder sweep for stalled exercises.
//!
//! Independent of the dispatch scanner: once a day it finds exercise
//! instances stuck `in_progress` for over 24 hours and emails the
//! participant a one-off nudge. No notification record is created —
//! this is fire-and-forget, outside the scheduled-notification ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use cadence_core::types::Timestamp;
use cadence_db::repositories::{UserExerciseRepo, UserRepo};
use cadence_db::DbPool;

use crate::channels::email::Mailer;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// An in-progress exercise untouched for this long counts as stalled.
const STALL_THRESHOLD_HOURS: i64 = 24;

/// Subject line for the stalled-exercise nudge.
const STALLED_SUBJECT: &str = "Unfinished exercise reminder";

/// Background service that nudges participants with stalled exercises.
pub struct ReminderSweep {
    pool: DbPool,
    mailer: Option<Arc<dyn Mailer>>,
    client_url: String,
}

impl ReminderSweep {
    /// Create a sweep. `mailer` is `None` when SMTP is not configured, in
    /// which case every run is a no-op.
    pub fn new(pool: DbPool, mailer: Option<Arc<dyn Mailer>>, client_url: String) -> Self {
        Self {
            pool,
            mailer,
            client_url,
        }
    }

    /// Run the daily sweep loop until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = SWEEP_INTERVAL.as_secs(),
            "Reminder sweep started"
        );

        let mut interval = tokio::time::interval(SWEEP_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder sweep stopping");
                    break;
                }
                _ = interval.tick() => {
                    let now = Local::now().naive_local();
                    match self.sweep(now).await {
                        Ok(reminded) if reminded > 0 => {
                            tracing::info!(reminded, "Reminder sweep complete");
                        }
                        Ok(_) => {
                            tracing::debug!("Reminder sweep: nothing stalled");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Reminder sweep abandoned");
                        }
                    }
                }
            }
        }
    }

    /// Process one sweep at the given wall-clock time.
    ///
    /// Returns the number of reminder emails sent. Per-participant failures
    /// are logged and skipped; the sweep is best-effort.
    pub async fn sweep(&self, now: Timestamp) -> Result<usize, sqlx::Error> {
        let Some(mailer) = &self.mailer else {
            tracing::debug!("Reminder sweep: email not configured");
            return Ok(0);
        };

        let cutoff = now - chrono::Duration::hours(STALL_THRESHOLD_HOURS);
        let stalled = UserExerciseRepo::find_stalled(&self.pool, cutoff).await?;

        let mut reminded = 0;
        for exercise in &stalled {
            let Some(user) = UserRepo::get(&self.pool, exercise.user_id).await? else {
                continue;
            };

            let link = format!("{}/exercises/{}", self.client_url, exercise.id);
            let html = render_stalled_reminder(&user.name, &link);

            match mailer.send_html(&user.email, STALLED_SUBJECT, &html).await {
                Ok(()) => reminded += 1,
                Err(e) => {
                    tracing::error!(
                        user_id = user.id,
                        exercise_id = exercise.id,
                        error = %e,
                        "Stalled-exercise reminder failed"
                    );
                }
            }
        }

        Ok(reminded)
    }
}

/// Render the stalled-exercise HTML body. Distinct template from the
/// scheduled-notification reminder.
fn render_stalled_reminder(name: &str, link: &str) -> String {
    format!(
        r#"<div style="font-family: Helvetica, Arial, sans-serif;">
  <h2>Hello {name},</h2>
  <p>You have an unfinished exercise. Please sign in to continue where you left off.</p>
  <a href="{link}" style="background: #4F46E5; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; display: inline-block; margin-top: 10px;">
    Continue your exercise
  </a>
</div>"#
    )
}
