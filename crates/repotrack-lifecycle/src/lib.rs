//! Repository lifecycle orchestration for repotrack.
//!
//! Keeps the repository store and the remote webhook registrations in step.
//! Storage is written first inside a transaction, the webhook call happens
//! while the row is staged, and the transaction is rolled back if the remote
//! call fails.

pub mod orchestrator;

pub use orchestrator::{HookAction, LifecycleError, LifecycleResult, RepositoryLifecycle};
