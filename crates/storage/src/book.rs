use mathocr_core::ProblemRecord;
use tokio::sync::Mutex;

use crate::config::StorageConfig;
use crate::repository::{open_repository, BackendKind, ProblemRepository, StorageError};

struct BookState {
    repo: Box<dyn ProblemRepository>,
    records: Vec<ProblemRecord>,
}

/// The visible problem list together with the backend it was loaded from.
///
/// The list mirrors what the active backend returned on its last successful
/// load; a failed write or switch leaves it untouched. A record that was saved
/// but could not be reloaded is still appended to the list. All operations are
/// serialized through one lock.
pub struct ProblemBook {
    config: StorageConfig,
    state: Mutex<BookState>,
}

impl ProblemBook {
    /// Open the backend named by `config.backend` and load its records.
    pub async fn open(config: StorageConfig) -> Result<Self, StorageError> {
        let repo = open_repository(config.backend, &config).await?;
        let records = repo.load_all().await?;
        tracing::info!(backend = %config.backend, count = records.len(), "problem list loaded");
        Ok(Self {
            config,
            state: Mutex::new(BookState { repo, records }),
        })
    }

    pub async fn active_backend(&self) -> BackendKind {
        self.state.lock().await.repo.kind()
    }

    pub async fn records(&self) -> Vec<ProblemRecord> {
        self.state.lock().await.records.clone()
    }

    /// Store `record` in the active backend and reload the list from it.
    ///
    /// If the save succeeds but the reload fails, `record` is appended to the
    /// visible list and [`StorageError::ReloadAfterSave`] is returned.
    pub async fn record(&self, record: ProblemRecord) -> Result<Vec<ProblemRecord>, StorageError> {
        let mut state = self.state.lock().await;
        state.repo.append(&record).await?;
        let records = match state.repo.load_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(backend = %state.repo.kind(), "problem saved but reload failed: {e}");
                state.records.push(record);
                return Err(StorageError::ReloadAfterSave(Box::new(e)));
            }
        };
        tracing::info!(
            backend = %state.repo.kind(),
            problem = record.problem(),
            result = record.result(),
            "problem recorded"
        );
        state.records = records.clone();
        Ok(records)
    }

    /// Make `kind` the active backend and replace the list with its contents.
    /// Neither backend is written to.
    pub async fn switch_backend(&self, kind: BackendKind) -> Result<Vec<ProblemRecord>, StorageError> {
        let mut state = self.state.lock().await;
        let repo = open_repository(kind, &self.config).await?;
        let records = repo.load_all().await?;
        tracing::info!(from = %state.repo.kind(), to = %kind, count = records.len(), "storage backend switched");
        state.repo = repo;
        state.records = records.clone();
        Ok(records)
    }

    /// Re-read the list from the active backend.
    pub async fn reload(&self) -> Result<Vec<ProblemRecord>, StorageError> {
        let mut state = self.state.lock().await;
        let records = state.repo.load_all().await?;
        state.records = records.clone();
        Ok(records)
    }

    /// Delete everything in the active backend.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        state.repo.clear().await?;
        state.records.clear();
        tracing::info!(backend = %state.repo.kind(), "problem list cleared");
        Ok(())
    }
}
