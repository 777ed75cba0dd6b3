use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::protocol::Resource;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

mod resources;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// Typed failures callers may want to tell apart from plain I/O errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{resource} references a row that does not exist")]
    ForeignKey { resource: &'static str },
}

/// CRUD access to one table. Implemented by [`Storage`] for every resource.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>>;
    async fn find(&self, id: R::Id) -> Result<Option<R>>;
    async fn insert(&self, draft: &R::Draft) -> Result<R>;
    /// Returns `None` when no row has `id`.
    async fn update(&self, id: R::Id, patch: &R::Patch) -> Result<Option<R>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: R::Id) -> Result<bool>;
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

fn write_error(err: sqlx::Error, resource: &'static str) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return StorageError::ForeignKey { resource }.into();
        }
    }
    anyhow::Error::new(err).context(format!("failed to write {resource}"))
}

pub fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
