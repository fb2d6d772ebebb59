use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{path}: {msg}")]
    Corrupt { path: PathBuf, msg: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;
