use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown URI: {uri}")]
    UnknownUri { uri: String },

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported operation {operation} on {uri}")]
    Unsupported { operation: &'static str, uri: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Schema upgrade failed: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
