use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mathocr_core::ProblemRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::repository::{BackendKind, ProblemRepository, StorageError};

/// Flat-file store: the whole list as a JSON array, base64-encoded into a
/// single text file. Every append rewrites the file.
pub struct FileRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles on `path`.
    write_lock: Mutex<()>,
}

impl FileRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<ProblemRecord>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        decode(&content)
    }

    async fn write_records(&self, records: &[ProblemRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write beside the target then rename, so readers never see a partial file.
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, encode(records)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ProblemRepository for FileRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn append(&self, record: &ProblemRecord) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records().await?;
        records.push(record.clone());
        self.write_records(&records).await?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "problem file rewritten");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<ProblemRecord>, StorageError> {
        self.read_records().await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sibling path used while rewriting `path`: the full file name plus `.tmp`,
/// so it never collides with `path` itself.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Encode records into the file's text form.
pub fn encode(records: &[ProblemRecord]) -> Result<String, StorageError> {
    let json = serde_json::to_string(records)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decode the file's text form. Blank content is an empty list.
pub fn decode(content: &str) -> Result<Vec<ProblemRecord>, StorageError> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let bytes = STANDARD
        .decode(content)
        .map_err(|e| StorageError::Decode(e.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|e| StorageError::Decode(e.to_string()))?;
    Ok(serde_json::from_str(&json)?)
}
