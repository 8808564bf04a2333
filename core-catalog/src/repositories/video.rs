//! Video repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::Video;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};

/// Video repository interface for data access operations
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Find a video by its external identifier
    async fn find_by_id(&self, id: &str) -> Result<Option<Video>>;

    /// Insert or replace a video (replace-on-conflict by `video_id`)
    ///
    /// Stub rows (no description, no playback URL) are valid; later sync
    /// stages replace them with enriched rows.
    async fn upsert(&self, video: &Video) -> Result<()>;

    /// Insert or replace a batch of videos inside one transaction
    async fn upsert_many(&self, videos: &[Video]) -> Result<u64>;

    /// List all videos in insertion order
    async fn list(&self) -> Result<Vec<Video>>;

    /// Delete a video by identifier
    ///
    /// Association rows referencing it are not pruned.
    async fn delete_by_id(&self, id: &str) -> Result<u64>;

    /// Delete all videos, returning the number of rows removed
    async fn delete_all(&self) -> Result<u64>;

    /// Count videos
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of VideoRepository
pub struct SqliteVideoRepository {
    pool: SqlitePool,
}

impl SqliteVideoRepository {
    /// Create a new SQLite video repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO videos (
        video_id, title, image_url, details_url,
        description, list_url, video_url
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
    "#;

fn validated(video: &Video) -> Result<&Video> {
    video.validate().map_err(|msg| CatalogError::InvalidInput {
        field: "video".to_string(),
        message: msg,
    })?;
    Ok(video)
}

#[async_trait]
impl VideoRepository for SqliteVideoRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Video>> {
        let video = query_as::<_, Video>("SELECT * FROM videos WHERE video_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(video)
    }

    async fn upsert(&self, video: &Video) -> Result<()> {
        let video = validated(video)?;

        sqlx::query(INSERT_SQL)
            .bind(&video.video_id)
            .bind(&video.title)
            .bind(&video.image_url)
            .bind(&video.details_url)
            .bind(&video.description)
            .bind(&video.list_url)
            .bind(&video.video_url)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn upsert_many(&self, videos: &[Video]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        for video in videos {
            let video = validated(video)?;
            sqlx::query(INSERT_SQL)
                .bind(&video.video_id)
                .bind(&video.title)
                .bind(&video.image_url)
                .bind(&video.details_url)
                .bind(&video.description)
                .bind(&video.list_url)
                .bind(&video.video_url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(videos.len() as u64)
    }

    async fn list(&self) -> Result<Vec<Video>> {
        let videos = query_as::<_, Video>("SELECT * FROM videos ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(videos)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM videos WHERE video_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM videos").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
