//! Repository store (for monitored Git repos).

use async_trait::async_trait;
use repotrack_core::{Repository, RepositoryId, parse_full_name};
use sqlx::{PgPool, Postgres, Transaction};

use crate::{DbError, DbResult};

/// Owner format enforced by the `repositories_owner_format` check constraint.
pub const OWNER_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9-]*$";

/// Name format enforced by the `repositories_name_format` check constraint.
pub const NAME_PATTERN: &str = r"^[A-Za-z0-9_.-]+$";

/// Database row for repositories.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RepositoryRow {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub private: bool,
}

impl From<RepositoryRow> for Repository {
    fn from(row: RepositoryRow) -> Self {
        Repository {
            id: Some(RepositoryId::new(row.id)),
            owner: row.owner,
            name: row.name,
            private: row.private,
        }
    }
}

/// Opens transactional scopes over the repository table.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn begin(&self) -> DbResult<Box<dyn RepositoryTx>>;
}

/// Repository operations inside one open transaction.
///
/// Dropping the handle without calling [`RepositoryTx::commit`] rolls the
/// transaction back.
#[async_trait]
pub trait RepositoryTx: Send {
    /// List repositories of an owner in insertion order.
    async fn list_by_owner(&mut self, owner: &str) -> DbResult<Vec<Repository>>;

    /// Get a repository by full name (owner/name).
    async fn get_by_full_name(&mut self, full_name: &str) -> DbResult<Repository>;

    /// Insert a repository and assign its id.
    async fn create(&mut self, repo: &mut Repository) -> DbResult<()>;

    /// Delete a repository by full name. Missing rows are not an error.
    async fn delete(&mut self, full_name: &str) -> DbResult<()>;

    async fn commit(self: Box<Self>) -> DbResult<()>;

    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// PostgreSQL implementation.
#[derive(Clone)]
pub struct PgRepositoryStore {
    pool: PgPool,
}

impl PgRepositoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepositoryStore for PgRepositoryStore {
    async fn begin(&self) -> DbResult<Box<dyn RepositoryTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRepositoryTx { tx }))
    }
}

pub struct PgRepositoryTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RepositoryTx for PgRepositoryTx {
    async fn list_by_owner(&mut self, owner: &str) -> DbResult<Vec<Repository>> {
        let rows = sqlx::query_as::<_, RepositoryRow>(
            "SELECT id, owner, name, private FROM repositories WHERE owner = $1 ORDER BY id",
        )
        .bind(owner)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Repository::from).collect())
    }

    async fn get_by_full_name(&mut self, full_name: &str) -> DbResult<Repository> {
        let (owner, name) = parse_full_name(full_name)?;

        let row = sqlx::query_as::<_, RepositoryRow>(
            "SELECT id, owner, name, private FROM repositories WHERE owner = $1 AND name = $2",
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("repository {}", full_name)))?;

        Ok(row.into())
    }

    async fn create(&mut self, repo: &mut Repository) -> DbResult<()> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO repositories (owner, name, private)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&repo.owner)
        .bind(&repo.name)
        .bind(repo.private)
        .fetch_one(&mut *self.tx)
        .await?;

        repo.id = Some(RepositoryId::new(id));
        Ok(())
    }

    async fn delete(&mut self, full_name: &str) -> DbResult<()> {
        let (owner, name) = parse_full_name(full_name)?;

        sqlx::query("DELETE FROM repositories WHERE owner = $1 AND name = $2")
            .bind(owner)
            .bind(name)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
