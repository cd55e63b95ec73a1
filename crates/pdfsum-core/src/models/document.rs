use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::UPLOADS_URL_PREFIX;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl Display for DocumentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Completed => write!(f, "completed"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "processing" => Ok(DocumentStatus::Processing),
            "completed" => Ok(DocumentStatus::Completed),
            "failed" => Ok(DocumentStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid document status: {}", s)),
        }
    }
}

/// Stored PDF metadata. The file itself lives in the upload directory under `filename`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    /// `{id}_{original_name}`, unique per upload
    pub filename: String,
    /// Sanitized user-supplied filename
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Public URL path of the stored file.
    pub fn url(&self) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, self.filename)
    }

    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / 1024.0 / 1024.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        let url = doc.url();
        DocumentResponse {
            id: doc.id,
            filename: doc.filename,
            original_name: doc.original_name,
            file_path: doc.file_path,
            file_size: doc.file_size,
            mime_type: doc.mime_type,
            status: doc.status,
            uploaded_at: doc.uploaded_at,
            updated_at: doc.updated_at,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        let id = Uuid::new_v4();
        Document {
            id,
            filename: format!("{}_report.pdf", id),
            original_name: "report.pdf".to_string(),
            file_path: format!("uploads/{}_report.pdf", id),
            file_size: 2 * 1024 * 1024,
            mime_type: "application/pdf".to_string(),
            status: DocumentStatus::Pending,
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_document_url_mirrors_filename() {
        let doc = sample_document();
        assert_eq!(doc.url(), format!("/uploads/{}", doc.filename));
    }

    #[test]
    fn test_document_response_from_document() {
        let doc = sample_document();
        let id = doc.id;
        let response = DocumentResponse::from(doc);
        assert_eq!(response.id, id);
        assert_eq!(response.original_name, "report.pdf");
        assert_eq!(response.status, DocumentStatus::Pending);
        assert!(response.url.starts_with("/uploads/"));
    }

    #[test]
    fn test_file_size_mb() {
        assert!((sample_document().file_size_mb() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!(
            "completed".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::Completed
        );
        assert_eq!(DocumentStatus::Pending.to_string(), "pending");
        assert!("archived".parse::<DocumentStatus>().is_err());
    }
}
