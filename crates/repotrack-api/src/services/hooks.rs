//! Client for the hooks service.

use async_trait::async_trait;
use reqwest::StatusCode;
use repotrack_core::webhook::{WebhookError, WebhookRegistrar, WebhookResult};
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{encode_full_name, endpoint};

/// Registers and removes repository webhooks through the hooks service.
pub struct HooksClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HooksClient {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl WebhookRegistrar for HooksClient {
    async fn create_hook(&self, full_name: &str) -> WebhookResult<()> {
        let response = self
            .client
            .post(endpoint(&self.base_url, "/repositories"))
            .json(&json!({ "full_name": full_name }))
            .send()
            .await
            .map_err(|e| WebhookError::Request(e.to_string()))?;

        let status = response.status();
        debug!(full_name = %full_name, status = %status, "Hook creation responded");

        if status != StatusCode::CREATED {
            return Err(WebhookError::CreateRejected {
                full_name: full_name.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    async fn delete_hook(&self, full_name: &str) -> WebhookResult<()> {
        let path = format!("/repositories/{}", encode_full_name(full_name));

        let response = self
            .client
            .delete(endpoint(&self.base_url, &path))
            .send()
            .await
            .map_err(|e| WebhookError::Request(e.to_string()))?;

        let status = response.status();
        debug!(full_name = %full_name, status = %status, "Hook removal responded");

        if status != StatusCode::NO_CONTENT {
            return Err(WebhookError::DeleteRejected {
                full_name: full_name.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
