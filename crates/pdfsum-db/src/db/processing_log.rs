use pdfsum_core::models::{EntityType, NewProcessingLog, ProcessingLog};
use pdfsum_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Trait for the append-only audit table
#[async_trait::async_trait]
pub trait ProcessingLogRepositoryTrait: Send + Sync {
    async fn insert(&self, log: NewProcessingLog) -> Result<ProcessingLog, AppError>;

    /// Events for one entity, oldest first.
    async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<ProcessingLog>, AppError>;
}

#[derive(Clone)]
pub struct ProcessingLogRepository {
    pool: PgPool,
}

impl ProcessingLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProcessingLogRepositoryTrait for ProcessingLogRepository {
    #[tracing::instrument(skip(self, log), fields(
        db.table = "processing_logs",
        db.operation = "insert",
        entity_id = %log.entity_id,
        action = %log.action,
        status = %log.status
    ))]
    async fn insert(&self, log: NewProcessingLog) -> Result<ProcessingLog, AppError> {
        let log = log.into_log();

        let row = sqlx::query_as::<Postgres, ProcessingLog>(
            r#"
            INSERT INTO processing_logs (
                id, entity_type, entity_id, action, status, message, metadata, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, entity_type, entity_id, action, status, message, metadata, created_at
            "#,
        )
        .bind(log.id)
        .bind(log.entity_type)
        .bind(log.entity_id)
        .bind(log.action)
        .bind(log.status)
        .bind(&log.message)
        .bind(&log.metadata)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "processing_logs", db.operation = "select_list", entity_id = %entity_id))]
    async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<ProcessingLog>, AppError> {
        let rows = sqlx::query_as::<Postgres, ProcessingLog>(
            r#"
            SELECT id, entity_type, entity_id, action, status, message, metadata, created_at
            FROM processing_logs
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
