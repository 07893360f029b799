pub mod book;
pub mod config;
pub mod db;
pub mod file;
pub mod repository;

pub use book::ProblemBook;
pub use config::{StorageConfig, PROBLEM_DB_NAME, PROBLEM_FILE_NAME};
pub use db::{create_db, DbPool, SqliteRepository};
pub use file::FileRepository;
pub use repository::{open_repository, BackendKind, ProblemRepository, StorageError};
