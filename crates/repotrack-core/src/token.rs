//! Access token lookup for the hosting platform.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unable to fetch token for {username}: {message}")]
    Request { username: String, message: String },

    #[error("unsuccessful response for {username}, status {status}: {body}")]
    Status {
        username: String,
        status: u16,
        body: String,
    },

    #[error("cannot decode token response for {username}: {message}")]
    Body { username: String, message: String },

    #[error("token for {0} cannot be empty")]
    Empty(String),
}

pub type TokenResult<T> = std::result::Result<T, TokenError>;

/// Resolves a user's hosting platform access token.
///
/// Implementations must treat an empty token as [`TokenError::Empty`] even if
/// the remote call itself succeeded.
#[async_trait]
pub trait TokenLookup: Send + Sync {
    async fn get_token(&self, username: &str) -> TokenResult<String>;
}
