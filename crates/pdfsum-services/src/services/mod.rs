//! Domain services
//!
//! `document` and `summary` own the two aggregates; `audit` is shared by both.
//! `summarizer` and `extraction` talk to the external summarization service.

pub mod audit;
pub mod document;
pub mod export;
pub mod extraction;
pub mod summarizer;
pub mod summary;
