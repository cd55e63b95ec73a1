//! Test doubles shared by this crate's tests and the API integration tests.

mod mock_repositories;

pub use mock_repositories::{
    InMemoryDocumentRepository, InMemoryProcessingLogRepository, InMemorySummaryRepository,
};

/// `len` bytes starting with a PDF header.
pub fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(len, b'0');
    data
}
