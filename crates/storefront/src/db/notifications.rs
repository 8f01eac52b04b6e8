//! Notification repository.

use sqlx::PgPool;

use verdant_core::{NotificationId, UserId};

use super::RepositoryError;
use crate::models::Notification;

/// Repository for the per-user notification feed.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a notification to the user's feed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        message: &str,
    ) -> Result<Notification, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(
            r"
            INSERT INTO notifications (user_id, message)
            VALUES ($1, $2)
            RETURNING id, user_id, message, read, created_at
            ",
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(self.pool)
        .await?;

        Ok(notification)
    }

    /// List the user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r"
            SELECT id, user_id, message, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(notifications)
    }

    /// Count the user's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Mark a single notification as read.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was updated, `false` if it didn't exist or
    /// belongs to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark all of the user's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
