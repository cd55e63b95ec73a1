//! Storage abstraction trait
//!
//! This module defines the Storage trait that document storage backends implement.

use async_trait::async_trait;
use pdfsum_core::AppError;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Byte source consumed by [`Storage::upload_stream`].
pub type StorageStream = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage abstraction trait
///
/// The document service and the summary worker only talk to files through this
/// trait, so tests can swap the backend for a temporary directory.
///
/// **Key format:** `{document_id}_{sanitized_name}`. See the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Copy the reader to `storage_key` until EOF and return the number of bytes written.
    ///
    /// The file is synced before returning. On error a partially written file may
    /// remain; callers remove it with [`Storage::delete`].
    async fn upload_stream(&self, storage_key: &str, reader: StorageStream) -> StorageResult<u64>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing file is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Location recorded on the document row for this key.
    fn file_path(&self, storage_key: &str) -> StorageResult<String>;

    /// Public URL path under which the file is served.
    fn public_url(&self, storage_key: &str) -> String;

    /// Verify the backend is usable (used by the health endpoint).
    async fn health_check(&self) -> StorageResult<()>;
}
