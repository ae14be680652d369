//! Repository for the `users` table.
//!
//! Doubles as the user preference store consumed by the delivery engine:
//! the chosen morning time and the push subscription descriptor live here.

use cadence_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, name, is_active, morning_notification_time, push_subscription, \
                       created_at, updated_at";

/// Provides CRUD operations for participants.
pub struct UserRepo;

impl UserRepo {
    /// Create a participant, returning the generated ID.
    pub async fn create(pool: &PgPool, email: &str, name: &str) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO users (email, name) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Fetch a participant by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the participant-chosen morning notification time (`"HH:MM"`).
    pub async fn set_morning_time(
        pool: &PgPool,
        user_id: DbId,
        time: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users \
             SET morning_notification_time = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(time)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a Web Push subscription descriptor.
    pub async fn set_push_subscription(
        pool: &PgPool,
        user_id: DbId,
        subscription: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users \
             SET push_subscription = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(subscription)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a stored push subscription.
    ///
    /// Called by the push channel when the endpoint reports itself
    /// permanently gone, so future scans skip the user.
    pub async fn clear_push_subscription(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users \
             SET push_subscription = NULL, updated_at = now() \
             WHERE id = $1",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
