//! # Catalog Store Module
//!
//! Owns the local cache of the remote video catalog and provides the
//! URI-dispatched content store over it.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite schema for categories, videos, and their associations
//! - The closed URI registry and the pattern matcher over it
//! - The content store façade (query/insert/delete/update/content_type)
//! - Repository patterns backing the façade
//!
//! The store is a disposable cache: rows are replaced wholesale by sync runs
//! and schema upgrades drop everything.

pub mod db;
pub mod error;
pub mod matcher;
pub mod models;
pub mod registry;
pub mod repositories;
pub mod schema;
pub mod store;
pub mod uri;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{CatalogError, Result};
pub use matcher::{ResourceMatch, UriMatcher};
pub use models::{Category, CategoryVideo, Video};
pub use registry::Resource;
pub use store::{ContentStore, ContentValues, QueryResult};
pub use uri::{CatalogUri, AUTHORITY, SCHEME};
