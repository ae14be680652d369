//! Exercise template and instance models.

use cadence_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `exercise_templates` table.
///
/// `notifications` holds the published JSON array of notification
/// configurations; it is immutable once participants are enrolled.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExerciseTemplate {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub notifications: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `user_exercises` table: one participant's instance of a
/// template, with its own lifecycle status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserExercise {
    pub id: DbId,
    pub user_id: DbId,
    pub exercise_template_id: DbId,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub last_accessed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
