//! Enumeration of a user's repositories on the hosting platform.

use async_trait::async_trait;
use thiserror::Error;

use crate::Repository;
use crate::token::TokenError;

/// Errors raised while listing remote repositories.
///
/// Every variant is terminal for the call: no partial results are returned.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("unable to resolve access token: {0}")]
    TokenResolution(#[from] TokenError),

    #[error("hosting API request rate limit reached")]
    RateLimitExceeded,

    #[error("no such user: {0}")]
    UnknownUser(String),

    #[error("request for page {page} failed: {message}")]
    Request { page: u32, message: String },

    #[error("API error on page {page} (status {status}): {body}")]
    Api { page: u32, status: u16, body: String },

    #[error("cannot decode page {page}: {message}")]
    Parse { page: u32, message: String },
}

pub type EnumerationResult<T> = std::result::Result<T, EnumerationError>;

/// Lists every remote repository visible to a user.
#[async_trait]
pub trait HostingEnumerator: Send + Sync {
    async fn user_repositories(&self, username: &str) -> EnumerationResult<Vec<Repository>>;
}
