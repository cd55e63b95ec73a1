use chrono::{DateTime, SecondsFormat, Utc};

use pdfsum_core::constants::CSV_CONTENT_PREVIEW_CHARS;
use pdfsum_core::models::{Document, DocumentResponse, ExportFormat, Summary};
use pdfsum_core::AppError;

const DOCUMENT_HEADER: [&str; 5] = ["ID", "Original Name", "File Size (MB)", "Status", "Uploaded At"];
const SUMMARY_HEADER: [&str; 7] = [
    "ID",
    "PDF ID",
    "Language",
    "Style",
    "Status",
    "Content Preview",
    "Created At",
];

/// A rendered export, ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Serializes full listing results to CSV or JSON
pub struct Exporter;

impl Exporter {
    pub fn documents(
        documents: Vec<Document>,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> Result<ExportFile, AppError> {
        let body = match format {
            ExportFormat::Csv => {
                let rows = documents.iter().map(|d| {
                    vec![
                        d.id.to_string(),
                        d.original_name.clone(),
                        format!("{:.2}", d.file_size_mb()),
                        d.status.to_string(),
                        timestamp(d.uploaded_at),
                    ]
                });
                write_csv(&DOCUMENT_HEADER, rows)?
            }
            ExportFormat::Json => {
                let data: Vec<DocumentResponse> =
                    documents.into_iter().map(DocumentResponse::from).collect();
                serde_json::to_vec_pretty(&data)
                    .map_err(|e| AppError::Internal(format!("Failed to encode JSON export: {}", e)))?
            }
        };

        Ok(ExportFile {
            filename: export_filename("pdfs", format, now),
            content_type: format.content_type(),
            body,
        })
    }

    pub fn summaries(
        summaries: Vec<Summary>,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> Result<ExportFile, AppError> {
        let body = match format {
            ExportFormat::Csv => {
                let rows = summaries.iter().map(|s| {
                    vec![
                        s.id.to_string(),
                        s.pdf_id.to_string(),
                        s.language.to_string(),
                        s.style.to_string(),
                        s.status.to_string(),
                        s.content_preview(CSV_CONTENT_PREVIEW_CHARS),
                        timestamp(s.created_at),
                    ]
                });
                write_csv(&SUMMARY_HEADER, rows)?
            }
            ExportFormat::Json => serde_json::to_vec_pretty(&summaries)
                .map_err(|e| AppError::Internal(format!("Failed to encode JSON export: {}", e)))?,
        };

        Ok(ExportFile {
            filename: export_filename("summaries", format, now),
            content_type: format.content_type(),
            body,
        })
    }
}

fn write_csv<I>(header: &[&str], rows: I) -> Result<Vec<u8>, AppError>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| AppError::Internal(format!("Failed to write CSV export: {}", e));

    writer.write_record(header).map_err(csv_err)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV export: {}", e)))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn export_filename(prefix: &str, format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
