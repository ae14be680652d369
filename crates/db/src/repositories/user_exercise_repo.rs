//! Repository for the `user_exercises` table.

use cadence_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::exercise::UserExercise;

/// Column list for `user_exercises` queries.
const COLUMNS: &str = "id, user_id, exercise_template_id, status, started_at, completed_at, \
                       last_accessed_at, created_at, updated_at";

/// Provides CRUD operations for per-participant exercise instances.
pub struct UserExerciseRepo;

impl UserExerciseRepo {
    /// Create an instance (status `locked`), returning the generated ID.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        exercise_template_id: DbId,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO user_exercises (user_id, exercise_template_id) \
             VALUES ($1, $2) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(exercise_template_id)
        .fetch_one(pool)
        .await
    }

    /// Fetch an instance by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<UserExercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_exercises WHERE id = $1");
        sqlx::query_as::<_, UserExercise>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update the lifecycle status.
    ///
    /// Transition validity is the caller's concern (see
    /// `cadence_core::exercise`); this is a plain column update.
    pub async fn set_status(pool: &PgPool, id: DbId, status: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_exercises \
             SET status = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move an instance into `in_progress`, stamping `started_at` on first
    /// start and refreshing `last_accessed_at`.
    pub async fn mark_started(pool: &PgPool, id: DbId, at: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_exercises \
             SET status = 'in_progress', \
                 started_at = COALESCE(started_at, $2), \
                 last_accessed_at = $2, \
                 updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Refresh `last_accessed_at` when the participant touches the exercise.
    pub async fn touch_last_accessed(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_exercises \
             SET last_accessed_at = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List in-progress instances not touched since `cutoff`.
    ///
    /// Feeds the daily reminder sweep. Instances that were started but never
    /// accessed again (null `last_accessed_at`) do not match; the start
    /// itself stamps `last_accessed_at`, so a null means legacy data.
    pub async fn find_stalled(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<UserExercise>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_exercises \
             WHERE status = 'in_progress' AND last_accessed_at < $1 \
             ORDER BY last_accessed_at"
        );
        sqlx::query_as::<_, UserExercise>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }
}
