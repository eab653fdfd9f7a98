//! Shared error type for maria4rs crates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to '{url}' returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub(crate) fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            source,
        }
    }
}
