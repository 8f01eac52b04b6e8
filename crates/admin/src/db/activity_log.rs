//! Activity-log repository: the admin audit trail.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::ActivityLog;

/// Repository for the admin audit trail.
pub struct ActivityLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityLogRepository<'a> {
    /// Create a new activity-log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record an admin action.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record(
        &self,
        actor: &str,
        action: &str,
        subject: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO activity_logs (actor, action, subject) VALUES ($1, $2, $3)",
        )
        .bind(actor)
        .bind(action)
        .bind(subject)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List the most recent activity entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityLog>, RepositoryError> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            r"
            SELECT id, actor, action, subject, created_at
            FROM activity_logs
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
