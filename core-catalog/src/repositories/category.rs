//! Category repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::Category;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};

/// Category repository interface for data access operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category by its external identifier
    ///
    /// # Returns
    /// - `Ok(Some(category))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if a database error occurs
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// Insert or replace a category (replace-on-conflict by `category_id`)
    async fn upsert(&self, category: &Category) -> Result<()>;

    /// Insert or replace a batch of categories inside one transaction
    ///
    /// Either every row lands or none do.
    async fn upsert_many(&self, categories: &[Category]) -> Result<u64>;

    /// List all categories in insertion order
    async fn list(&self) -> Result<Vec<Category>>;

    /// Delete a category by identifier
    ///
    /// Association rows referencing it are left in place; the store never
    /// cascades.
    async fn delete_by_id(&self, id: &str) -> Result<u64>;

    /// Delete all categories, returning the number of rows removed
    async fn delete_all(&self) -> Result<u64>;

    /// Count categories
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of CategoryRepository
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    /// Create a new SQLite category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = "INSERT INTO categories (category_id, title, url) VALUES (?, ?, ?)";

fn validated(category: &Category) -> Result<&Category> {
    category
        .validate()
        .map_err(|msg| CatalogError::InvalidInput {
            field: "category".to_string(),
            message: msg,
        })?;
    Ok(category)
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        let category = query_as::<_, Category>("SELECT * FROM categories WHERE category_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn upsert(&self, category: &Category) -> Result<()> {
        let category = validated(category)?;

        sqlx::query(INSERT_SQL)
            .bind(&category.category_id)
            .bind(&category.title)
            .bind(&category.url)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn upsert_many(&self, categories: &[Category]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        for category in categories {
            let category = validated(category)?;
            sqlx::query(INSERT_SQL)
                .bind(&category.category_id)
                .bind(&category.title)
                .bind(&category.url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(categories.len() as u64)
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let categories = query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
