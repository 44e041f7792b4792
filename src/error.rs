//! Error types for the backend client layer.

use thiserror::Error;

/// Failures from talking to the Akita backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure, including request timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the backend.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the response body, if any
        message: String,
    },

    /// Missing or unusable local configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for backend client operations.
pub type ApiResult<T> = Result<T, ApiError>;
