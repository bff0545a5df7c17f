//! Core domain types and capability traits for repotrack.
//!
//! This crate contains:
//! - The repository entity and full name parsing
//! - Capability traits for the remote collaborators (webhooks, tokens, hosting)
//! - Domain error types

pub mod error;
pub mod hosting;
pub mod id;
pub mod repository;
pub mod token;
pub mod webhook;

pub use error::{Error, Result};
pub use id::RepositoryId;
pub use repository::{Repository, parse_full_name};
