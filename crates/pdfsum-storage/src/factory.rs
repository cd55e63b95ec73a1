use crate::{LocalStorage, Storage, StorageResult};
use pdfsum_core::Config;
use std::sync::Arc;

/// Create the storage backend for the configured upload directory
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.upload_dir().clone()).await?;

    tracing::info!(
        upload_dir = %config.upload_dir().display(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
