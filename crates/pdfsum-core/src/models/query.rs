//! Listing and export query types shared by document and summary listings.
//!
//! `ListQueryParams` is the raw query-string shape; `DocumentListQuery` and
//! `SummaryListQuery` are the normalized forms the repositories execute.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::document::DocumentStatus;
use super::summary::{Language, SummaryStatus, SummaryStyle};
use crate::constants::EXPORT_ROW_LIMIT;
use crate::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Page window applied after filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Single page covering the whole result set (export mode).
    pub fn export() -> Self {
        Self {
            page: 1,
            limit: EXPORT_ROW_LIMIT,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentSortField {
    #[default]
    UploadedAt,
    UpdatedAt,
    OriginalName,
    Status,
}

impl DocumentSortField {
    /// Unknown or empty names fall back to `uploaded_at`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("updated_at") => DocumentSortField::UpdatedAt,
            Some("original_name") => DocumentSortField::OriginalName,
            Some("status") => DocumentSortField::Status,
            _ => DocumentSortField::UploadedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            DocumentSortField::UploadedAt => "uploaded_at",
            DocumentSortField::UpdatedAt => "updated_at",
            DocumentSortField::OriginalName => "original_name",
            DocumentSortField::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummarySortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SummarySortField {
    /// Unknown or empty names fall back to `created_at`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("updated_at") => SummarySortField::UpdatedAt,
            _ => SummarySortField::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SummarySortField::CreatedAt => "created_at",
            SummarySortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentListQuery {
    pub search: Option<String>,
    pub status: Option<DocumentStatus>,
    /// Inclusive, from the start of the day
    pub date_from: Option<NaiveDate>,
    /// Inclusive, to the end of the day
    pub date_to: Option<NaiveDate>,
    pub sort_by: DocumentSortField,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct SummaryListQuery {
    pub pdf_id: Uuid,
    pub search: Option<String>,
    pub status: Option<SummaryStatus>,
    pub language: Option<Language>,
    pub style: Option<SummaryStyle>,
    pub sort_by: SummarySortField,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl SummaryListQuery {
    pub fn for_document(pdf_id: Uuid) -> Self {
        Self {
            pdf_id,
            search: None,
            status: None,
            language: None,
            style: None,
            sort_by: SummarySortField::default(),
            sort_order: SortOrder::default(),
            page: PageRequest::default(),
        }
    }
}

/// Query string accepted by the listing endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListQueryParams {
    /// Page number, values below 1 are treated as 1
    pub page: Option<i64>,
    /// Page size, at most 100
    #[validate(range(max = 100, message = "limit must be at most 100"))]
    pub limit: Option<i64>,
    /// Case-insensitive substring match on the name (documents) or content (summaries)
    pub search: Option<String>,
    pub status: Option<String>,
    /// Documents only, `YYYY-MM-DD`
    pub date_from: Option<String>,
    /// Documents only, `YYYY-MM-DD`
    pub date_to: Option<String>,
    /// Summaries only
    pub language: Option<String>,
    /// Summaries only
    pub style: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub export: Option<ExportFormat>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

impl ListQueryParams {
    fn page_request(&self) -> PageRequest {
        if self.export.is_some() {
            return PageRequest::export();
        }
        let limit = match self.limit {
            Some(limit) if limit >= 1 => limit.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        PageRequest::new(self.page.unwrap_or(DEFAULT_PAGE), limit)
    }

    pub fn document_query(&self) -> Result<DocumentListQuery, AppError> {
        let status = non_empty(&self.status)
            .map(|s| s.parse::<DocumentStatus>())
            .transpose()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        let date_from = non_empty(&self.date_from)
            .map(|s| parse_date("date_from", s))
            .transpose()?;
        let date_to = non_empty(&self.date_to)
            .map(|s| parse_date("date_to", s))
            .transpose()?;

        Ok(DocumentListQuery {
            search: non_empty(&self.search).map(str::to_string),
            status,
            date_from,
            date_to,
            sort_by: DocumentSortField::from_param(self.sort_by.as_deref()),
            sort_order: self.sort_order.unwrap_or_default(),
            page: self.page_request(),
        })
    }

    pub fn summary_query(&self, pdf_id: Uuid) -> Result<SummaryListQuery, AppError> {
        let status = non_empty(&self.status)
            .map(|s| s.parse::<SummaryStatus>())
            .transpose()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        let language = non_empty(&self.language)
            .map(|s| s.parse::<Language>())
            .transpose()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        let style = non_empty(&self.style)
            .map(|s| s.parse::<SummaryStyle>())
            .transpose()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        Ok(SummaryListQuery {
            pdf_id,
            search: non_empty(&self.search).map(str::to_string),
            status,
            language,
            style,
            sort_by: SummarySortField::from_param(self.sort_by.as_deref()),
            sort_order: self.sort_order.unwrap_or_default(),
            page: self.page_request(),
        })
    }
}
