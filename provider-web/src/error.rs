//! Web backend error types

use core_sync::BackendError;
use thiserror::Error;

/// Errors from the JSON catalog web API.
#[derive(Error, Debug)]
pub enum WebError {
    /// Transport-level failure (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status after retries were exhausted.
    #[error("API error: status={status_code}, {message}")]
    ApiError { status_code: u16, message: String },

    /// Response body did not decode as the expected document.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<WebError> for BackendError {
    fn from(e: WebError) -> Self {
        match e {
            WebError::Transport(_) | WebError::ApiError { .. } => {
                BackendError::Http(e.to_string())
            }
            WebError::ParseError(msg) => BackendError::Decode(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
