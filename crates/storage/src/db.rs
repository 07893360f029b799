use async_trait::async_trait;
use mathocr_core::ProblemRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

use crate::repository::{BackendKind, ProblemRepository, StorageError};

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS problems (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            problem TEXT NOT NULL,
            result INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_problem(pool: &DbPool, record: &ProblemRecord) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO problems (problem, result) VALUES (?, ?)")
        .bind(record.problem())
        .bind(record.result())
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_all_problems(pool: &DbPool) -> Result<Vec<ProblemRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT problem, result FROM problems ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(problem, result)| ProblemRecord::new(problem, result))
        .collect())
}

pub async fn delete_all_problems(pool: &DbPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM problems").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Structured store backed by the `problems` table.
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(create_db(path).await?))
    }

    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProblemRepository for SqliteRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }

    async fn append(&self, record: &ProblemRecord) -> Result<(), StorageError> {
        let id = insert_problem(&self.pool, record).await?;
        tracing::debug!(id, "problem row inserted");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<ProblemRecord>, StorageError> {
        Ok(get_all_problems(&self.pool).await?)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let removed = delete_all_problems(&self.pool).await?;
        tracing::debug!(removed, "problem rows deleted");
        Ok(())
    }
}
