//! Webhook registration capability.
//!
//! The registrar subscribes the hooks service to push notifications for a
//! repository. Registrations live entirely on the remote side; nothing about
//! them is persisted locally.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("request to hooks service failed: {0}")]
    Request(String),

    #[error("unable to create hook for {full_name} (status {status})")]
    CreateRejected { full_name: String, status: u16 },

    #[error("unable to delete hook for {full_name} (status {status})")]
    DeleteRejected { full_name: String, status: u16 },
}

pub type WebhookResult<T> = std::result::Result<T, WebhookError>;

/// Creates and removes webhook subscriptions by repository full name.
#[async_trait]
pub trait WebhookRegistrar: Send + Sync {
    async fn create_hook(&self, full_name: &str) -> WebhookResult<()>;

    async fn delete_hook(&self, full_name: &str) -> WebhookResult<()>;
}
