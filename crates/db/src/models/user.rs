//! Participant entity model.

use cadence_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
///
/// `morning_notification_time` and `push_subscription` form the user
/// preference store consumed by the scheduling and delivery engine: the
/// former feeds `user_time` schedules, the latter is the opaque Web Push
/// endpoint descriptor (cleared when the endpoint reports itself gone).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub morning_notification_time: Option<String>,
    pub push_subscription: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
