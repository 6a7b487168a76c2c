//! Client error types

use thiserror::Error;

/// Errors raised while setting up the client. Request failures are not
/// errors: the gateway folds them into an unsuccessful `ApiResponse`.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for client setup
pub type ClientResult<T> = Result<T, ClientError>;
