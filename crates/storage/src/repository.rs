use async_trait::async_trait;
use mathocr_core::ProblemRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::StorageConfig;
use crate::db::SqliteRepository;
use crate::file::FileRepository;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Problem file is not valid encoded text: {0}")]
    Decode(String),
    #[error("Problem file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Problem saved, but reloading the list failed: {0}")]
    ReloadAfterSave(#[source] Box<StorageError>),
}

/// Which persistence backend holds the problem list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Base64-wrapped JSON array in a single text file.
    #[default]
    File,
    /// SQLite table.
    Database,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::File => write!(f, "file"),
            BackendKind::Database => write!(f, "database"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "database" | "db" => Ok(BackendKind::Database),
            other => Err(format!("Unknown storage backend: '{other}'")),
        }
    }
}

/// Uniform contract over the problem stores.
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Persist one more record after the existing ones.
    async fn append(&self, record: &ProblemRecord) -> Result<(), StorageError>;

    /// Every stored record, in insertion order.
    async fn load_all(&self) -> Result<Vec<ProblemRecord>, StorageError>;

    /// Remove every record held by this backend.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Open the backend of the given kind using the paths from `config`.
pub async fn open_repository(
    kind: BackendKind,
    config: &StorageConfig,
) -> Result<Box<dyn ProblemRepository>, StorageError> {
    let repo: Box<dyn ProblemRepository> = match kind {
        BackendKind::File => Box::new(FileRepository::new(config.file_path.clone())),
        BackendKind::Database => Box::new(SqliteRepository::open(&config.db_path).await?),
    };
    Ok(repo)
}
