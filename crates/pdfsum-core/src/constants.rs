//! Upload limits and fixed values for PDF documents.

/// Smallest accepted upload (1 KiB).
pub const MIN_FILE_SIZE: u64 = 1024;

/// Largest accepted upload (3 MiB).
pub const MAX_FILE_SIZE: u64 = 3 * 1024 * 1024;

/// The only accepted file extension, compared case-insensitively.
pub const ALLOWED_EXTENSION: &str = ".pdf";

/// MIME type recorded for every stored document.
pub const ALLOWED_MIME_TYPE: &str = "application/pdf";

/// `%PDF`
pub const PDF_MAGIC: [u8; 4] = [0x25, 0x50, 0x44, 0x46];

/// Public URL prefix under which stored files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Row cap applied when a listing is exported instead of paginated.
pub const EXPORT_ROW_LIMIT: i64 = 10_000;

/// Maximum characters of summary content written to a CSV export row.
pub const CSV_CONTENT_PREVIEW_CHARS: usize = 100;
