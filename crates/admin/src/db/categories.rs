//! Category repository: CRUD for the admin dashboard.

use sqlx::PgPool;

use verdant_core::CategoryId;

use super::RepositoryError;
use crate::models::CategoryWithCount;

/// Repository for category management.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories with their product counts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r"
            SELECT c.id, c.name, c.description, COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id, c.name, c.description
            ORDER BY c.name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Get a category by ID, with its product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<CategoryWithCount>, RepositoryError> {
        let category = sqlx::query_as::<_, CategoryWithCount>(
            r"
            SELECT c.id, c.name, c.description, COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id, c.name, c.description
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CategoryId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CategoryId>(
            r"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(id)
    }

    /// Update a category's name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        description: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, description = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a category.
    ///
    /// Rejected when products still reference it (FK RESTRICT).
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if products still reference the
    /// category. Returns `RepositoryError::Database` for other errors.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "category still has products".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
