//! Notification scheduling and delivery engine.
//!
//! This crate turns the declarative per-exercise notification configuration
//! into persisted, dispatched prompts:
//!
//! - [`activation`] — runs the schedule generator when an exercise instance
//!   is activated and persists the resulting records.
//! - [`channels`] — the two delivery channels (Web Push, email), each
//!   reporting a [`DeliveryOutcome`] per attempt.
//! - [`scanner`] — the per-minute dispatch loop that routes due records to
//!   both channels.
//! - [`sweep`] — the daily reminder sweep for stalled exercises.

pub mod activation;
pub mod channels;
pub mod outcome;
pub mod scanner;
pub mod sweep;

pub use activation::schedule_exercise_notifications;
pub use channels::email::{EmailChannel, EmailConfig, EmailError, Mailer, SmtpMailer};
pub use channels::push::{
    HttpPushTransport, PushChannel, PushError, PushSubscription, PushTransport,
};
pub use outcome::DeliveryOutcome;
pub use scanner::{DispatchScanner, TickSummary};
pub use sweep::ReminderSweep;
