//! Customer repository: read-only views over the users table.

use sqlx::PgPool;

use verdant_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::CustomerRow;

/// Repository for customer reads.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List customers with aggregate order data, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CustomerRow>, RepositoryError> {
        let customers = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT u.id, u.email, u.name, u.role, u.created_at,
                   COUNT(o.id) AS order_count,
                   SUM(o.total_amount) FILTER (WHERE o.status <> 'cancelled')
                       AS total_spent
            FROM users u
            LEFT JOIN orders o ON o.user_id = u.id
            GROUP BY u.id, u.email, u.name, u.role, u.created_at
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    /// Count all customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Look up a user's role by email, for admin access checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, String, UserRole)>, RepositoryError> {
        let row = sqlx::query_as::<_, (UserId, String, UserRole)>(
            "SELECT id, name, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Look up a user's role by ID, for per-request admin re-checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_by_id(&self, id: UserId) -> Result<Option<UserRole>, RepositoryError> {
        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(role)
    }
}
