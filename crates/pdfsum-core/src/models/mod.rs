//! Data models for the application
//!
//! Documents and summaries are the two persisted aggregates; processing logs
//! record what happened to them. Query types describe listing and export.

mod document;
mod pagination;
mod processing_log;
mod query;
mod summary;

pub use document::*;
pub use pagination::*;
pub use processing_log::*;
pub use query::*;
pub use summary::*;
