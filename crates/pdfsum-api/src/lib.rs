//! PDF Summarizer API Library
//!
//! This crate provides the HTTP handlers, error rendering and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use setup::{initialize_app, Repositories};
pub use state::AppState;
