//! Repository entity for monitored Git repositories.

use serde::{Deserialize, Serialize};

use crate::{Error, RepositoryId, Result};

/// A monitored repository, identified externally by `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Assigned by the store on insert; `None` until persisted.
    #[serde(skip)]
    pub id: Option<RepositoryId>,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub private: bool,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, private: bool) -> Self {
        Self {
            id: None,
            owner: owner.into(),
            name: name.into(),
            private,
        }
    }

    /// Canonical `owner/name` identifier.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Check the fields a create request must carry. Owner is checked first.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() {
            return Err(Error::Validation("owner must not be empty".to_string()));
        }
        if self.name.is_empty() {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Split a full name into `(owner, name)`.
///
/// Exactly one `/` is allowed and neither side may be empty.
pub fn parse_full_name(full_name: &str) -> Result<(&str, &str)> {
    let incorrect = || Error::IncorrectFullName(full_name.to_string());

    let (owner, name) = full_name.split_once('/').ok_or_else(incorrect)?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(incorrect());
    }
    Ok((owner, name))
}
