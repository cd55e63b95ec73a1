//! PDF Summarizer Processing Library
//!
//! Upload-time checks run before anything touches disk or the database: the
//! `PdfValidator` (size, extension, magic number) and filename sanitization.

pub mod filename;
pub mod validator;

pub use filename::sanitize_filename;
pub use validator::{PdfValidator, ValidationError};
