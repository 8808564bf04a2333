//! Physical schema for the catalog cache
//!
//! Owns the table definitions and the (destructive) migration policy. The
//! store is a cache of remote state, not a source of truth: a schema version
//! bump drops everything and recreates, and the next sync run repopulates.
//!
//! Table and column names are stable string constants; the registry and the
//! content store consume them, so a rename here must be synchronized there.

use crate::error::{CatalogError, Result};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Categories table name.
pub const CATEGORIES_TABLE: &str = "categories";
/// Videos table name.
pub const VIDEOS_TABLE: &str = "videos";
/// Category-video association (join) table name.
pub const ASSOCIATIONS_TABLE: &str = "categories_videos";

/// External category identifier column (unique, replace-on-conflict).
pub const COLUMN_CATEGORY_ID: &str = "category_id";
/// External video identifier column (unique, replace-on-conflict).
pub const COLUMN_VIDEO_ID: &str = "video_id";

/// Ensure the schema matches [`SCHEMA_VERSION`].
///
/// Fresh databases are created in place; databases at an older (or newer)
/// version are dropped and recreated via [`upgrade`].
pub async fn prepare(pool: &SqlitePool) -> Result<()> {
    let version = user_version(pool).await?;

    if version == SCHEMA_VERSION {
        debug!(version, "Schema up to date");
        return Ok(());
    }

    if version == 0 {
        info!(version = SCHEMA_VERSION, "Creating catalog schema");
        create(pool).await?;
    } else {
        upgrade(pool, version, SCHEMA_VERSION).await?;
    }

    set_user_version(pool, SCHEMA_VERSION).await
}

/// Create the three catalog tables.
///
/// Each table carries a surrogate `id` primary key; callers only ever see it
/// as row ordering. Uniqueness of the external identifiers resolves via
/// `ON CONFLICT REPLACE`, so a plain INSERT is an upsert and no separate
/// update path exists. The association table's REFERENCES clauses are
/// documentation of intent only; foreign keys are not enforced for this
/// database (see `db::create_pool`).
pub async fn create(pool: &SqlitePool) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {CATEGORIES_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {COLUMN_CATEGORY_ID} TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
            title TEXT NOT NULL,
            url TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {VIDEOS_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {COLUMN_VIDEO_ID} TEXT NOT NULL UNIQUE ON CONFLICT REPLACE,
            title TEXT NOT NULL,
            image_url TEXT NOT NULL,
            details_url TEXT NOT NULL,
            description TEXT,
            list_url TEXT,
            video_url TEXT
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ASSOCIATIONS_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {COLUMN_CATEGORY_ID} TEXT NOT NULL
                REFERENCES {CATEGORIES_TABLE} ({COLUMN_CATEGORY_ID}),
            {COLUMN_VIDEO_ID} TEXT NOT NULL
                REFERENCES {VIDEOS_TABLE} ({COLUMN_VIDEO_ID}),
            UNIQUE ({COLUMN_CATEGORY_ID}, {COLUMN_VIDEO_ID}) ON CONFLICT REPLACE
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Destructive migration: drop all three tables in dependency order
/// (association table first) and recreate them empty.
///
/// Total data loss is accepted here; the cache repopulates on the next sync
/// run, so this logs a warning rather than failing.
pub async fn upgrade(pool: &SqlitePool, old_version: i32, new_version: i32) -> Result<()> {
    warn!(
        old_version,
        new_version, "Upgrading catalog schema; all cached rows will be dropped"
    );

    for table in [ASSOCIATIONS_TABLE, VIDEOS_TABLE, CATEGORIES_TABLE] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(pool)
            .await?;
    }

    create(pool).await
}

async fn user_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

async fn set_user_version(pool: &SqlitePool, version: i32) -> Result<()> {
    // PRAGMA does not accept bind parameters.
    sqlx::query(&format!("PRAGMA user_version = {version}"))
        .execute(pool)
        .await
        .map_err(|e| CatalogError::Schema(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(name)
                .fetch_one(pool)
                .await
                .unwrap();
        count == 1
    }

    #[tokio::test]
    async fn test_prepare_creates_tables_and_version() {
        let pool = create_test_pool().await.unwrap();

        for table in [CATEGORIES_TABLE, VIDEOS_TABLE, ASSOCIATIONS_TABLE] {
            assert!(table_exists(&pool, table).await, "{table} should exist");
        }

        let version: i32 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_prepare_is_idempotent() {
        let pool = create_test_pool().await.unwrap();
        prepare(&pool).await.unwrap();
        prepare(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_upgrade_drops_cached_rows() {
        let pool = create_test_pool().await.unwrap();

        sqlx::query("INSERT INTO categories (category_id, title, url) VALUES ('c1', 'T', 'u')")
            .execute(&pool)
            .await
            .unwrap();

        upgrade(&pool, SCHEMA_VERSION, SCHEMA_VERSION + 1).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unique_replace_on_categories() {
        let pool = create_test_pool().await.unwrap();

        sqlx::query("INSERT INTO categories (category_id, title, url) VALUES ('c1', 'Old', 'u1')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO categories (category_id, title, url) VALUES ('c1', 'New', 'u2')")
            .execute(&pool)
            .await
            .unwrap();

        let (count, title): (i64, String) =
            sqlx::query_as("SELECT COUNT(*), MAX(title) FROM categories WHERE category_id = 'c1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
        assert_eq!(title, "New");
    }
}
