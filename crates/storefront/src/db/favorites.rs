//! Favorites repository.
//!
//! A favorite is a user-to-product relation that also maintains the
//! denormalized `products.likes` counter. The row change and the counter
//! adjustment happen in one transaction so the counter tracks the relation
//! under concurrent toggles.

use sqlx::PgPool;

use verdant_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;

/// Repository for favorite operations.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Toggle a favorite.
    ///
    /// # Returns
    ///
    /// `(favorited, likes)` — whether the product is now favorited, and the
    /// product's like count after the toggle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(bool, i32), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO favorites (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?
        .rows_affected()
            > 0;

        let likes = if inserted {
            sqlx::query_scalar::<_, i32>(
                "UPDATE products SET likes = likes + 1 WHERE id = $1 RETURNING likes",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?
        } else {
            sqlx::query(
                "DELETE FROM favorites WHERE user_id = $1 AND product_id = $2",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query_scalar::<_, i32>(
                "UPDATE products SET likes = GREATEST(likes - 1, 0) WHERE id = $1 RETURNING likes",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?
        };

        tx.commit().await?;

        Ok((inserted, likes))
    }

    /// List the user's favorited products, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.name, p.description, p.price, p.stock, p.images,
                   p.category_id, p.likes, p.ordered_count, p.featured,
                   p.created_at, p.updated_at
            FROM favorites f
            JOIN products p ON p.id = f.product_id
            WHERE f.user_id = $1
            ORDER BY f.added_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Whether the user has favorited the given product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM favorites WHERE user_id = $1 AND product_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// IDs of the user's favorited products (for badge rendering in lists).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ids_for_user(&self, user_id: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM favorites WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }
}
