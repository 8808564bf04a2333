//! # Repository Pattern Implementation
//!
//! Repository traits and SQLite implementations for the three catalog
//! aggregates. The content store composes these; nothing else should issue
//! SQL against the catalog tables.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - SQLite implementations use sqlx for async database access
//! - All operations return `Result<T>` for error handling
//! - `upsert_many` variants run inside a single transaction, so each sync
//!   stage's write batch is atomic
//!
//! Inserts rely on the schema's `ON CONFLICT REPLACE` uniqueness: writing a
//! row whose external identifier already exists replaces the old row, which
//! is the only update path in this store.

pub mod association;
pub mod category;
pub mod video;

pub use association::{AssociationRepository, SqliteAssociationRepository};
pub use category::{CategoryRepository, SqliteCategoryRepository};
pub use video::{SqliteVideoRepository, VideoRepository};
