//! Cart repository.
//!
//! Cart lines are keyed (user, product, color) and mutated with upserts, so
//! concurrent updates from two tabs resolve at the database without a
//! read-modify-write window. An empty `color_name` means no color chosen.

use sqlx::PgPool;

use verdant_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the user's cart lines joined with live product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.product_id, p.name, p.price, ci.color_name, ci.quantity,
                   p.stock, p.images[1] AS image
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.added_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Add a quantity of a product to the cart.
    ///
    /// If the line already exists, the quantity is added to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        color_name: &str,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, color_name, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id, color_name)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(color_name)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Set the quantity of a cart line. Zero removes the line.
    ///
    /// Setting a quantity on a line that does not exist creates it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        color_name: &str,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        if quantity == 0 {
            self.remove(user_id, product_id, color_name).await?;
            return Ok(());
        }

        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, color_name, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id, color_name)
            DO UPDATE SET quantity = EXCLUDED.quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(color_name)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Remove a cart line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was removed, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
        color_name: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE user_id = $1 AND product_id = $2 AND color_name = $3
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(color_name)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every line in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Total item count across the user's cart (sum of quantities).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COALESCE(SUM(quantity), 0)
            FROM cart_items
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
