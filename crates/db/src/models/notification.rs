//! Notification entity model and DTOs.

use cadence_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// Lifecycle: created by exercise activation, `sent_at` stamped once by the
/// dispatch scanner, `read_at`/`clicked` stamped by participant interaction.
/// Rows are never deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub exercise_id: DbId,
    pub kind: String,
    pub message: String,
    pub scheduled_for: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub read_at: Option<Timestamp>,
    pub clicked: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a scheduled notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub exercise_id: DbId,
    pub kind: String,
    pub message: String,
    pub scheduled_for: Timestamp,
}
