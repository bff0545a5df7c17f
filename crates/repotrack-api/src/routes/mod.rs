//! API routes.

pub mod health;
pub mod repositories;

use crate::AppState;
use axum::Router;

/// Build the main API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/repositories", repositories::router())
        .merge(health::router())
        .with_state(state)
}
