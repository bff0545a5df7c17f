//! API server for repotrack.
//!
//! Provides the HTTP REST API and the clients for the hooks, tokens and
//! GitHub services.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;
