//! Repository for the `exercise_templates` table.

use cadence_core::types::DbId;
use sqlx::PgPool;

use crate::models::exercise::ExerciseTemplate;

/// Column list for `exercise_templates` queries.
const COLUMNS: &str =
    "id, title, description, instructions, notifications, created_at, updated_at";

/// Provides read access to published exercise templates.
///
/// Template authoring lives in the admin service; this crate only needs to
/// create rows for tests and read the notification configurations at
/// activation time.
pub struct ExerciseTemplateRepo;

impl ExerciseTemplateRepo {
    /// Create a template, returning the generated ID.
    pub async fn create(
        pool: &PgPool,
        title: &str,
        notifications: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO exercise_templates (title, notifications) \
             VALUES ($1, $2) \
             RETURNING id",
        )
        .bind(title)
        .bind(notifications)
        .fetch_one(pool)
        .await
    }

    /// Fetch a template by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<ExerciseTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercise_templates WHERE id = $1");
        sqlx::query_as::<_, ExerciseTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
