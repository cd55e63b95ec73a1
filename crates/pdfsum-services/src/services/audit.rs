use std::sync::Arc;

use pdfsum_core::models::{
    AuditAction, AuditStatus, EntityType, NewProcessingLog, ProcessingLog,
};
use pdfsum_core::AppError;
use pdfsum_db::ProcessingLogRepositoryTrait;
use uuid::Uuid;

/// Append-only audit trail writer
///
/// Every event is mirrored to `tracing`. Insert failures are logged and swallowed
/// so that auditing never blocks the operation being audited.
#[derive(Clone)]
pub struct AuditLogger {
    repository: Arc<dyn ProcessingLogRepositoryTrait>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn ProcessingLogRepositoryTrait>) -> Self {
        Self { repository }
    }

    pub async fn record(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
        action: AuditAction,
        status: AuditStatus,
        message: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) {
        let message = message.into();

        if status == AuditStatus::Failed {
            tracing::warn!(
                entity_type = %entity_type,
                entity_id = %entity_id,
                action = %action,
                status = %status,
                metadata = ?metadata,
                "{}",
                message
            );
        } else {
            tracing::info!(
                entity_type = %entity_type,
                entity_id = %entity_id,
                action = %action,
                status = %status,
                "{}",
                message
            );
        }

        let log = NewProcessingLog {
            entity_type,
            entity_id,
            action,
            status,
            message,
            metadata,
        };

        if let Err(e) = self.repository.insert(log).await {
            tracing::error!(
                error = %e,
                entity_id = %entity_id,
                action = %action,
                "Failed to write processing log"
            );
        }
    }

    /// Events for one entity in chronological order.
    pub async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<ProcessingLog>, AppError> {
        self.repository.list_for_entity(entity_type, entity_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::InMemoryProcessingLogRepository;

    #[tokio::test]
    async fn test_record_appends_in_order() {
        let repo = Arc::new(InMemoryProcessingLogRepository::new());
        let audit = AuditLogger::new(repo.clone());
        let id = Uuid::new_v4();

        audit
            .record(EntityType::Pdf, id, AuditAction::Upload, AuditStatus::Started, "Starting PDF upload", None)
            .await;
        audit
            .record(
                EntityType::Pdf,
                id,
                AuditAction::Upload,
                AuditStatus::Success,
                "PDF uploaded successfully",
                Some(serde_json::json!({"size": 2048})),
            )
            .await;

        let logs = audit.list_for_entity(EntityType::Pdf, id).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, AuditStatus::Started);
        assert_eq!(logs[1].message, "PDF uploaded successfully");
        assert_eq!(logs[1].metadata.as_ref().unwrap()["size"], 2048);
    }

    #[tokio::test]
    async fn test_insert_failure_is_not_propagated() {
        let repo = Arc::new(InMemoryProcessingLogRepository::new());
        repo.set_fail_inserts(true);
        let audit = AuditLogger::new(repo.clone());
        let id = Uuid::new_v4();

        audit
            .record(EntityType::Summary, id, AuditAction::Generate, AuditStatus::Failed, "boom", None)
            .await;

        assert!(repo.all().is_empty());
    }
}
