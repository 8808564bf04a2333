//! # Video Catalog Core - Web Backend Provider
//!
//! `CatalogBackend` implementation over a JSON catalog feed served via HTTP.
//! The feed is four document kinds: a category index (`categories.json`),
//! per-category video lists, per-video details and per-video links. All
//! fetching goes through `reqwest` with bounded retry.

pub mod backend;
pub mod error;
pub mod transport;
pub mod types;

pub use backend::WebCatalogBackend;
pub use error::WebError;
pub use transport::{HttpTransport, ReqwestTransport};
