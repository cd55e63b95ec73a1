use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Summary lifecycle. `Processing` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Processing,
    Completed,
    Failed,
}

impl SummaryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SummaryStatus::Completed | SummaryStatus::Failed)
    }
}

impl Display for SummaryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SummaryStatus::Processing => write!(f, "processing"),
            SummaryStatus::Completed => write!(f, "completed"),
            SummaryStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SummaryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(SummaryStatus::Processing),
            "completed" => Ok(SummaryStatus::Completed),
            "failed" => Ok(SummaryStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid summary status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    En,
    Id,
    Cn,
    Jp,
    Kr,
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Language::En => write!(f, "EN"),
            Language::Id => write!(f, "ID"),
            Language::Cn => write!(f, "CN"),
            Language::Jp => write!(f, "JP"),
            Language::Kr => write!(f, "KR"),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EN" => Ok(Language::En),
            "ID" => Ok(Language::Id),
            "CN" => Ok(Language::Cn),
            "JP" => Ok(Language::Jp),
            "KR" => Ok(Language::Kr),
            _ => Err(anyhow::anyhow!(
                "Invalid language: {} (must be one of EN, ID, CN, JP, KR)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Professional,
    Simple,
}

impl Display for SummaryStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SummaryStyle::Professional => write!(f, "professional"),
            SummaryStyle::Simple => write!(f, "simple"),
        }
    }
}

impl FromStr for SummaryStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(SummaryStyle::Professional),
            "simple" => Ok(SummaryStyle::Simple),
            _ => Err(anyhow::anyhow!(
                "Invalid style: {} (must be one of professional, simple)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Summary {
    pub id: Uuid,
    pub pdf_id: Uuid,
    pub content: String,
    pub language: Language,
    pub style: SummaryStyle,
    pub status: SummaryStatus,
    pub is_edited: bool,
    /// Processing duration and model on success, `{"error": ...}` on failure
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Summary {
    /// New row in `processing` state with empty content.
    pub fn processing(id: Uuid, pdf_id: Uuid, language: Language, style: SummaryStyle) -> Self {
        let now = Utc::now();
        Summary {
            id,
            pdf_id,
            content: String::new(),
            language,
            style,
            status: SummaryStatus::Processing,
            is_edited: false,
            metadata: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// First `max_chars` characters of the content, with `...` appended when truncated.
    pub fn content_preview(&self, max_chars: usize) -> String {
        if self.content.chars().count() > max_chars {
            let truncated: String = self.content.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            self.content.clone()
        }
    }
}

/// Request DTO for starting summary generation
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct GenerateSummaryRequest {
    pub language: Language,
    pub style: SummaryStyle,
}

/// Request DTO for editing summary content
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSummaryRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}
