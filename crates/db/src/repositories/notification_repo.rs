//! Repository for the `notifications` table.

use cadence_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str =
    "id, user_id, exercise_id, kind, message, scheduled_for, sent_at, read_at, clicked, created_at";

/// Provides CRUD operations for scheduled notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a scheduled notification, returning the generated ID.
    pub async fn create(pool: &PgPool, input: &CreateNotification) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (user_id, exercise_id, kind, message, scheduled_for) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(input.exercise_id)
        .bind(&input.kind)
        .bind(&input.message)
        .bind(input.scheduled_for)
        .fetch_one(pool)
        .await
    }

    /// Fetch a single notification by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List unsent notifications whose schedule time falls inside
    /// `[window_start, window_end]`, ordered by schedule time.
    ///
    /// Rows with a non-null `sent_at` never match, which is what makes the
    /// dispatch scan idempotent across ticks.
    pub async fn find_due(
        pool: &PgPool,
        window_start: Timestamp,
        window_end: Timestamp,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE sent_at IS NULL \
               AND scheduled_for >= $1 \
               AND scheduled_for <= $2 \
             ORDER BY scheduled_for"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(window_start)
            .bind(window_end)
            .fetch_all(pool)
            .await
    }

    /// Stamp `sent_at`, but only if it is still null.
    ///
    /// This is the single atomic update both delivery channels funnel into:
    /// whichever lands first wins, repeat calls are no-ops, and the value
    /// never reverts. Returns `true` if this call performed the stamp.
    pub async fn mark_sent(pool: &PgPool, id: DbId, at: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET sent_at = $2 \
             WHERE id = $1 AND sent_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a notification as read by its owner.
    ///
    /// The first read wins; later calls keep the original `read_at`.
    /// Returns `true` if the notification belongs to the given user.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a notification as clicked by its owner. Clicking implies reading.
    pub async fn mark_clicked(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET clicked = TRUE, read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Inbox listing for a user: sent notifications only, newest schedule
    /// first.
    ///
    /// When `unread_only` is `true`, only notifications without a `read_at`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND read_at IS NULL"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 AND sent_at IS NOT NULL {filter} \
             ORDER BY scheduled_for DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Number of sent-but-unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE user_id = $1 AND sent_at IS NOT NULL AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
