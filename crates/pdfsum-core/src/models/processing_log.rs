use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Pdf,
    Summary,
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EntityType::Pdf => write!(f, "pdf"),
            EntityType::Summary => write!(f, "summary"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Upload,
    Delete,
    Generate,
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuditAction::Upload => write!(f, "upload"),
            AuditAction::Delete => write!(f, "delete"),
            AuditAction::Generate => write!(f, "generate"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Started,
    Processing,
    Success,
    Completed,
    Failed,
}

impl Display for AuditStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuditStatus::Started => write!(f, "started"),
            AuditStatus::Processing => write!(f, "processing"),
            AuditStatus::Success => write!(f, "success"),
            AuditStatus::Completed => write!(f, "completed"),
            AuditStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Append-only audit event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProcessingLog {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub status: AuditStatus,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an audit event; id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewProcessingLog {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub status: AuditStatus,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
}

impl NewProcessingLog {
    pub fn into_log(self) -> ProcessingLog {
        ProcessingLog {
            id: Uuid::new_v4(),
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            action: self.action,
            status: self.status,
            message: self.message,
            metadata: self.metadata,
            created_at: Utc::now(),
        }
    }
}
