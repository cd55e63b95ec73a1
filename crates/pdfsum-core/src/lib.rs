//! PDF Summarizer Core Library
//!
//! This crate provides the domain models, error types, configuration and upload
//! constants shared by every pdfsum component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, SummarizerConfig, UploadLimits};
pub use error::{AppError, ErrorMetadata, LogLevel};
