//! PDF Summarizer Services Layer
//!
//! This crate is the business service layer: the audit logger, the document
//! store, the summary orchestrator with its bounded job queue, the summarizer
//! client and the listing exporter. It re-exports the storage and validation
//! types the API crate needs so that crate depends on a single service facade.

pub mod job_queue;
pub mod services;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use job_queue::{JobOutcome, QueueError, SummaryJob, SummaryJobHandler, SummaryJobQueue};
pub use pdfsum_processing::{sanitize_filename, PdfValidator, ValidationError};
pub use pdfsum_storage::{create_storage, LocalStorage, Storage, StorageError, StorageResult};
pub use services::audit::AuditLogger;
pub use services::document::DocumentService;
pub use services::export::{ExportFile, Exporter};
pub use services::extraction::{extract_content, ExtractedContent, ExtractionStrategy};
pub use services::summarizer::{SummarizeRequest, SummarizerClient, SummarizerError};
pub use services::summary::{SummaryService, SummaryWorker};
