//! Repository store traits and implementations.

pub mod memory;
pub mod repository;

pub use memory::MemoryRepositoryStore;
pub use repository::{
    NAME_PATTERN, OWNER_PATTERN, PgRepositoryStore, PgRepositoryTx, RepositoryRow,
    RepositoryStore, RepositoryTx,
};
