//! Database repositories for data access layer
//!
//! One repository per table. Each is exposed as a trait so services can be tested
//! against in-memory implementations, plus a PostgreSQL implementation on sqlx.

pub mod document;
pub mod processing_log;
pub(crate) mod query;
pub mod summary;

pub use document::{DocumentRepository, DocumentRepositoryTrait};
pub use processing_log::{ProcessingLogRepository, ProcessingLogRepositoryTrait};
pub use summary::{SummaryRepository, SummaryRepositoryTrait};
