//! Store-assigned identifiers.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by the repository store on insert.
///
/// Internal only: lookups from the outside always go through the full name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
pub struct RepositoryId(i64);

impl RepositoryId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }
}
