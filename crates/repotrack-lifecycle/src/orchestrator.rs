//! Repository lifecycle orchestrator - create/delete with compensating rollback.

use std::fmt;
use std::sync::Arc;

use repotrack_core::webhook::{WebhookError, WebhookRegistrar};
use repotrack_core::{Repository, parse_full_name};
use repotrack_db::{DbError, RepositoryStore, RepositoryTx};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Log target for failures that leave store and webhooks out of step.
pub const RECONCILE_TARGET: &str = "repotrack::reconcile";

/// The remote side effect an operation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Registered,
    Removed,
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookAction::Registered => write!(f, "registered"),
            HookAction::Removed => write!(f, "removed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Rejected before any side effect.
    #[error(transparent)]
    Invalid(#[from] repotrack_core::Error),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// The webhook call succeeded but the transaction could not be committed.
    #[error("webhook {action} for {full_name} but commit failed: {source}")]
    Inconsistent {
        full_name: String,
        action: HookAction,
        source: DbError,
    },
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

/// Creates and deletes repositories together with their webhooks.
pub struct RepositoryLifecycle {
    store: Arc<dyn RepositoryStore>,
    hooks: Arc<dyn WebhookRegistrar>,
}

impl RepositoryLifecycle {
    pub fn new(store: Arc<dyn RepositoryStore>, hooks: Arc<dyn WebhookRegistrar>) -> Self {
        Self { store, hooks }
    }

    /// Persist a repository and register its webhook.
    ///
    /// The insert is staged first; if the webhook registration fails the
    /// transaction is rolled back and no row remains. A concurrent create of
    /// the same name loses on the store's uniqueness constraint before it
    /// reaches the registrar.
    pub async fn create(&self, mut repo: Repository) -> LifecycleResult<Repository> {
        repo.validate()?;
        let full_name = repo.full_name();
        parse_full_name(&full_name)?;

        let mut tx = self.store.begin().await?;

        if let Err(e) = tx.create(&mut repo).await {
            warn!(full_name = %full_name, error = %e, "Failed to insert repository");
            abort(tx, &full_name).await;
            return Err(e.into());
        }
        debug!(full_name = %full_name, id = ?repo.id, "Repository staged");

        if let Err(e) = self.hooks.create_hook(&full_name).await {
            warn!(full_name = %full_name, error = %e, "Webhook registration failed, rolling back");
            abort(tx, &full_name).await;
            return Err(e.into());
        }
        debug!(full_name = %full_name, "Webhook registered");

        commit(tx, &full_name, HookAction::Registered).await?;

        info!(full_name = %full_name, private = repo.private, "Repository created");
        Ok(repo)
    }

    /// Delete a repository and remove its webhook.
    ///
    /// If the webhook removal fails the delete is rolled back and the row is
    /// left exactly as it was.
    pub async fn delete(&self, owner: &str, name: &str) -> LifecycleResult<()> {
        let full_name = format!("{}/{}", owner, name);
        parse_full_name(&full_name)?;

        let mut tx = self.store.begin().await?;

        if let Err(e) = tx.delete(&full_name).await {
            warn!(full_name = %full_name, error = %e, "Failed to delete repository");
            abort(tx, &full_name).await;
            return Err(e.into());
        }
        debug!(full_name = %full_name, "Repository delete staged");

        if let Err(e) = self.hooks.delete_hook(&full_name).await {
            warn!(full_name = %full_name, error = %e, "Webhook removal failed, rolling back");
            abort(tx, &full_name).await;
            return Err(e.into());
        }
        debug!(full_name = %full_name, "Webhook removed");

        commit(tx, &full_name, HookAction::Removed).await?;

        info!(full_name = %full_name, "Repository deleted");
        Ok(())
    }
}

async fn abort(tx: Box<dyn RepositoryTx>, full_name: &str) {
    if let Err(e) = tx.rollback().await {
        // The connection drops the transaction anyway; nothing was committed.
        warn!(full_name = %full_name, error = %e, "Rollback failed");
    }
}

async fn commit(
    tx: Box<dyn RepositoryTx>,
    full_name: &str,
    action: HookAction,
) -> LifecycleResult<()> {
    tx.commit().await.map_err(|source| {
        error!(
            target: RECONCILE_TARGET,
            full_name = %full_name,
            webhook = %action,
            error = %source,
            "Commit failed after webhook call; store and webhooks need manual reconciliation"
        );
        LifecycleError::Inconsistent {
            full_name: full_name.to_string(),
            action,
            source,
        }
    })
}
