use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::repository::BackendKind;

pub const PROBLEM_FILE_NAME: &str = "problems.txt";
pub const PROBLEM_DB_NAME: &str = "problems.db";

/// Where each backend keeps its data, and which one is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    pub file_path: PathBuf,
    pub db_path: PathBuf,
}

impl StorageConfig {
    /// Default layout: both stores side by side in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        StorageConfig {
            backend: BackendKind::default(),
            file_path: dir.join(PROBLEM_FILE_NAME),
            db_path: dir.join(PROBLEM_DB_NAME),
        }
    }
}
