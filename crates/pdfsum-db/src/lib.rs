//! PDF Summarizer Database Library
//!
//! Repository traits and their PostgreSQL implementations.

pub mod db;

pub use db::*;
