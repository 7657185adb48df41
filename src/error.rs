use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(String),

    #[error("Failed to parse snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Failed to resolve current user: {0}")]
    Identity(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("memo with UID {uid} already exists")]
    MemoAlreadyExists { uid: String },

    #[error("memo not found: {0}")]
    MemoNotFound(String),

    /// `max` is in UTF-8 bytes.
    #[error("content too long (max {max} bytes)")]
    ContentTooLong { max: usize },

    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: String, value: String },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Import error: {0}")]
    Import(String),
}

pub type Result<T> = std::result::Result<T, MemoportError>;
