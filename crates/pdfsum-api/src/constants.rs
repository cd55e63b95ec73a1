//! API constants
//!
//! Every resource route is mounted under [`API_PREFIX`]. Health and the uploaded
//! files are served outside of it.

/// Versioned prefix for resource routes
pub const API_PREFIX: &str = "/v1";

/// Allowance on top of the maximum file size for multipart boundaries and headers.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Default server-wide cap on in-flight requests.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
