//! Product repository (read-only on the storefront side).
//!
//! Catalog writes happen through the admin binary; the storefront only reads
//! products and their color options. Like/ordered counters are adjusted by
//! the favorites and orders repositories as side effects of those flows.

use sqlx::PgPool;

use verdant_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::{Product, ProductColor};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, images, \
     category_id, likes, ordered_count, featured, created_at, updated_at";

/// Repository for product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category: Option<CategoryId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::int4 IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Count products, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, category: Option<CategoryId>) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::int4 IS NULL OR category_id = $1)
            ",
        )
        .bind(category)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE id = $1
            "
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// List featured products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE featured
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// List color options for a product, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn colors(&self, id: ProductId) -> Result<Vec<ProductColor>, RepositoryError> {
        let colors = sqlx::query_as::<_, ProductColor>(
            r"
            SELECT name, hex, image
            FROM product_colors
            WHERE product_id = $1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(colors)
    }
}
