use crate::order::Rejection;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The remote answered, but not with a 2xx status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Invalid value for {key}: {reason}")]
    Config { key: String, reason: String },

    /// A user-correctable order validation failure
    #[error(transparent)]
    Rejected(#[from] Rejection),
}
