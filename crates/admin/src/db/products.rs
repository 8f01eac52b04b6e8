//! Product repository: full catalog CRUD for the admin dashboard.

use sqlx::PgPool;

use verdant_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductColor, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, images, \
     category_id, likes, ordered_count, featured, created_at, updated_at";

/// Repository for product management.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first, optionally filtered by a name search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = search.map(|s| format!("%{s}%"));
        let query = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Count products, optionally filtered by a name search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, search: Option<&str>) -> Result<i64, RepositoryError> {
        let pattern = search.map(|s| format!("%{s}%"));
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(pattern)
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
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
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

    /// Create a product with its color options.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r"
            INSERT INTO products (name, description, price, stock, images, category_id, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock)
            .bind(&input.images)
            .bind(input.category_id)
            .bind(input.featured)
            .fetch_one(&mut *tx)
            .await?;

        insert_colors(&mut tx, product.id, &input.colors).await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Update a product and replace its color options.
    ///
    /// Likes and ordered counters are untouched; they belong to the
    /// favorites and order flows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5,
                images = $6, category_id = $7, featured = $8, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock)
            .bind(&input.images)
            .bind(input.category_id)
            .bind(input.featured)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM product_colors WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_colors(&mut tx, id, &input.colors).await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Delete a product.
    ///
    /// Order snapshots keep their copied name/price; their `product_id`
    /// reference becomes NULL.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adjust stock by a signed delta, refusing to go negative.
    ///
    /// # Returns
    ///
    /// The new stock level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the adjustment would make
    /// stock negative, `RepositoryError::NotFound` if the product doesn't
    /// exist.
    pub async fn adjust_stock(&self, id: ProductId, delta: i32) -> Result<i32, RepositoryError> {
        let stock = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE products
            SET stock = stock + $2, updated_at = now()
            WHERE id = $1 AND stock + $2 >= 0
            RETURNING stock
            ",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;

        match stock {
            Some(stock) => Ok(stock),
            None => {
                if self.get(id).await?.is_some() {
                    Err(RepositoryError::Conflict(
                        "stock cannot go negative".to_owned(),
                    ))
                } else {
                    Err(RepositoryError::NotFound)
                }
            }
        }
    }

    /// Products at or below a stock threshold, lowest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(
        &self,
        threshold: i32,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE stock <= $1
            ORDER BY stock ASC, name ASC
            LIMIT $2
            "
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(threshold)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }
}

/// Insert color options for a product, preserving input order.
async fn insert_colors(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: ProductId,
    colors: &[ProductColor],
) -> Result<(), RepositoryError> {
    for (position, color) in colors.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO product_colors (product_id, name, hex, image, position)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product_id)
        .bind(&color.name)
        .bind(&color.hex)
        .bind(&color.image)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
