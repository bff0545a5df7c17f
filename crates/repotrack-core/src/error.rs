//! Error types for repotrack domain input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("incorrect full name: {0:?}")]
    IncorrectFullName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
