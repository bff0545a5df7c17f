//! Application state.

use std::sync::Arc;

use repotrack_core::hosting::HostingEnumerator;
use repotrack_core::webhook::WebhookRegistrar;
use repotrack_db::RepositoryStore;
use repotrack_lifecycle::RepositoryLifecycle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RepositoryStore>,
    pub lifecycle: Arc<RepositoryLifecycle>,
    pub hosting: Arc<dyn HostingEnumerator>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RepositoryStore>,
        hooks: Arc<dyn WebhookRegistrar>,
        hosting: Arc<dyn HostingEnumerator>,
    ) -> Self {
        let lifecycle = Arc::new(RepositoryLifecycle::new(store.clone(), hooks));

        Self {
            store,
            lifecycle,
            hosting,
        }
    }
}
