//! Client for the users service that stores GitHub access tokens.

use async_trait::async_trait;
use reqwest::StatusCode;
use repotrack_core::token::{TokenError, TokenLookup, TokenResult};
use serde::Deserialize;
use url::Url;

use super::endpoint;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

/// Looks up access tokens by username.
pub struct TokenClient {
    client: reqwest::Client,
    base_url: Url,
}

impl TokenClient {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl TokenLookup for TokenClient {
    async fn get_token(&self, username: &str) -> TokenResult<String> {
        let path = format!("/users/{}", urlencoding::encode(username));

        let response = self
            .client
            .get(endpoint(&self.base_url, &path))
            .send()
            .await
            .map_err(|e| TokenError::Request {
                username: username.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TokenError::Body {
            username: username.to_string(),
            message: e.to_string(),
        })?;

        if status != StatusCode::OK {
            return Err(TokenError::Status {
                username: username.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| TokenError::Body {
            username: username.to_string(),
            message: e.to_string(),
        })?;

        if parsed.token.is_empty() {
            return Err(TokenError::Empty(username.to_string()));
        }

        Ok(parsed.token)
    }
}
