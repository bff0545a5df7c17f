//! In-process repository store.
//!
//! Mirrors the PostgreSQL store's observable behaviour: writes are staged per
//! transaction and only become visible to other transactions on commit, an
//! `(owner, name)` pair inserted by an open transaction is reserved until that
//! transaction finishes, and the owner/name format rules of the migration are
//! checked on insert.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use regex::Regex;
use repotrack_core::{Repository, RepositoryId, parse_full_name};

use super::repository::{NAME_PATTERN, OWNER_PATTERN, RepositoryStore, RepositoryTx};
use crate::{DbError, DbResult};

static OWNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(OWNER_PATTERN).expect("owner pattern is valid"));
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAME_PATTERN).expect("name pattern is valid"));

type Key = (String, String);

#[derive(Default)]
struct State {
    rows: Vec<Repository>,
    next_id: i64,
    reserved: HashSet<Key>,
}

/// Repository store kept in process memory.
#[derive(Clone, Default)]
pub struct MemoryRepositoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl RepositoryStore for MemoryRepositoryStore {
    async fn begin(&self) -> DbResult<Box<dyn RepositoryTx>> {
        Ok(Box::new(MemoryRepositoryTx {
            state: self.state.clone(),
            staged: Vec::new(),
            reserved: HashSet::new(),
            finished: false,
        }))
    }
}

enum Staged {
    Insert(Repository),
    Delete(Key),
}

pub struct MemoryRepositoryTx {
    state: Arc<Mutex<State>>,
    staged: Vec<Staged>,
    reserved: HashSet<Key>,
    finished: bool,
}

impl MemoryRepositoryTx {
    /// Committed rows with this transaction's staged writes applied.
    fn view(&self) -> Vec<Repository> {
        self.view_of(&lock(&self.state))
    }

    fn view_of(&self, state: &State) -> Vec<Repository> {
        let mut rows = state.rows.clone();
        apply(&mut rows, &self.staged);
        rows
    }

    /// Existence and reservation are judged under the caller's guard.
    fn is_taken(&self, state: &State, key: &Key) -> bool {
        let exists = self
            .view_of(state)
            .iter()
            .any(|r| r.owner == key.0 && r.name == key.1);
        let held_elsewhere = state.reserved.contains(key) && !self.reserved.contains(key);
        exists || held_elsewhere
    }

    fn release(&mut self) {
        let mut state = lock(&self.state);
        for key in self.reserved.drain() {
            state.reserved.remove(&key);
        }
        self.finished = true;
    }
}

fn apply(rows: &mut Vec<Repository>, staged: &[Staged]) {
    for op in staged {
        match op {
            Staged::Insert(repo) => rows.push(repo.clone()),
            Staged::Delete((owner, name)) => {
                rows.retain(|r| !(&r.owner == owner && &r.name == name));
            }
        }
    }
}

#[async_trait]
impl RepositoryTx for MemoryRepositoryTx {
    async fn list_by_owner(&mut self, owner: &str) -> DbResult<Vec<Repository>> {
        let mut rows: Vec<Repository> =
            self.view().into_iter().filter(|r| r.owner == owner).collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn get_by_full_name(&mut self, full_name: &str) -> DbResult<Repository> {
        let (owner, name) = parse_full_name(full_name)?;

        self.view()
            .into_iter()
            .find(|r| r.owner == owner && r.name == name)
            .ok_or_else(|| DbError::NotFound(format!("repository {}", full_name)))
    }

    async fn create(&mut self, repo: &mut Repository) -> DbResult<()> {
        if !OWNER_RE.is_match(&repo.owner) {
            return Err(DbError::ConstraintViolation(
                "repositories_owner_format".to_string(),
            ));
        }
        if !NAME_RE.is_match(&repo.name) {
            return Err(DbError::ConstraintViolation(
                "repositories_name_format".to_string(),
            ));
        }

        let key = (repo.owner.clone(), repo.name.clone());

        let mut state = lock(&self.state);
        if self.is_taken(&state, &key) {
            return Err(DbError::ConstraintViolation(
                "repositories_owner_name_key".to_string(),
            ));
        }

        state.next_id += 1;
        repo.id = Some(RepositoryId::new(state.next_id));
        state.reserved.insert(key.clone());
        drop(state);

        self.reserved.insert(key);
        self.staged.push(Staged::Insert(repo.clone()));
        Ok(())
    }

    async fn delete(&mut self, full_name: &str) -> DbResult<()> {
        let (owner, name) = parse_full_name(full_name)?;
        self.staged
            .push(Staged::Delete((owner.to_string(), name.to_string())));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        let staged = std::mem::take(&mut tx.staged);
        apply(&mut lock(&tx.state).rows, &staged);
        tx.release();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.staged.clear();
        tx.release();
        Ok(())
    }
}

impl Drop for MemoryRepositoryTx {
    fn drop(&mut self) {
        if !self.finished {
            self.release();
        }
    }
}
