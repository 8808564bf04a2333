//! Category-video association repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{CategoryVideo, Video};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};

/// Association repository interface for category membership rows
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    /// Insert or replace a membership row (replace-on-conflict per pair)
    async fn upsert(&self, association: &CategoryVideo) -> Result<()>;

    /// Insert or replace a batch of membership rows inside one transaction
    async fn upsert_many(&self, associations: &[CategoryVideo]) -> Result<u64>;

    /// The videos belonging to a category, via an inner join against the
    /// videos table. Returned rows are video columns; association rows whose
    /// video is missing simply drop out of the join.
    async fn videos_for_category(&self, category_id: &str) -> Result<Vec<Video>>;

    /// Delete the membership rows of one category
    ///
    /// The video rows themselves are untouched.
    async fn delete_by_category(&self, category_id: &str) -> Result<u64>;

    /// Delete all membership rows
    async fn delete_all(&self) -> Result<u64>;

    /// Count membership rows
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of AssociationRepository
pub struct SqliteAssociationRepository {
    pool: SqlitePool,
}

impl SqliteAssociationRepository {
    /// Create a new SQLite association repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = "INSERT INTO categories_videos (category_id, video_id) VALUES (?, ?)";

const JOIN_SQL: &str = r#"
    SELECT v.*
    FROM videos v
    INNER JOIN categories_videos cv ON cv.video_id = v.video_id
    WHERE cv.category_id = ?
    ORDER BY cv.id
    "#;

fn validated(association: &CategoryVideo) -> Result<&CategoryVideo> {
    association
        .validate()
        .map_err(|msg| CatalogError::InvalidInput {
            field: "association".to_string(),
            message: msg,
        })?;
    Ok(association)
}

#[async_trait]
impl AssociationRepository for SqliteAssociationRepository {
    async fn upsert(&self, association: &CategoryVideo) -> Result<()> {
        let association = validated(association)?;

        sqlx::query(INSERT_SQL)
            .bind(&association.category_id)
            .bind(&association.video_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn upsert_many(&self, associations: &[CategoryVideo]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        for association in associations {
            let association = validated(association)?;
            sqlx::query(INSERT_SQL)
                .bind(&association.category_id)
                .bind(&association.video_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(associations.len() as u64)
    }

    async fn videos_for_category(&self, category_id: &str) -> Result<Vec<Video>> {
        let videos = query_as::<_, Video>(JOIN_SQL)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(videos)
    }

    async fn delete_by_category(&self, category_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories_videos WHERE category_id = ?")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories_videos")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories_videos")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
