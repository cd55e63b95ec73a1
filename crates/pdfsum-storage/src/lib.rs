//! PDF Summarizer Storage Library
//!
//! This crate provides the storage abstraction for uploaded PDFs and its local
//! filesystem implementation.
//!
//! # Storage key format
//!
//! Every stored file is keyed `{document_id}_{sanitized_original_name}`, which keeps
//! duplicate uploads of the same name apart. The public URL path mirrors the key
//! under `/uploads/`.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StorageStream};
