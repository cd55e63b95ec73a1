//! Multipart upload spooling

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use pdfsum_core::AppError;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// The `file` field of an upload, copied to an anonymous temporary file and
/// rewound to the start
pub struct SpooledUpload {
    pub file: File,
    pub filename: String,
    /// Bytes received for the field
    pub size: u64,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

/// Copy the field named `file` to a temporary file. Other fields are ignored.
/// Only one `file` field is accepted.
pub async fn spool_multipart_file(mut multipart: Multipart) -> Result<SpooledUpload, AppError> {
    let mut upload: Option<SpooledUpload> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_default();

        let std_file = tempfile::tempfile()?;
        let mut file = File::from_std(std_file);
        let mut size: u64 = 0;

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }

        file.flush().await?;
        file.rewind().await?;

        upload = Some(SpooledUpload {
            file,
            filename,
            size,
        });
    }

    upload.ok_or_else(|| AppError::InvalidInput("File is required".to_string()))
}
