//! Shared key generation for stored documents.
//!
//! Key format: `{document_id}_{sanitized_original_name}`.

use pdfsum_core::constants::UPLOADS_URL_PREFIX;
use uuid::Uuid;

/// Generate the storage key for a document.
///
/// `sanitized_name` must already be restricted to the safe filename character set.
pub fn generate_storage_key(document_id: Uuid, sanitized_name: &str) -> String {
    format!("{}_{}", document_id, sanitized_name)
}

/// Public URL path of a stored key.
pub fn public_url(storage_key: &str) -> String {
    format!("{}/{}", UPLOADS_URL_PREFIX, storage_key)
}
