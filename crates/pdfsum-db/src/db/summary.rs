use pdfsum_core::models::{Summary, SummaryListQuery};
use pdfsum_core::AppError;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::query::{push_order_and_page, push_summary_filters};

const SUMMARY_COLUMNS: &str = "id, pdf_id, content, language, style, status, is_edited, \
     metadata, created_at, updated_at, deleted_at";

/// Trait for summary persistence
///
/// `mark_completed` and `mark_failed` only touch rows still in `processing`, so a
/// terminal status is never overwritten.
#[async_trait::async_trait]
pub trait SummaryRepositoryTrait: Send + Sync {
    async fn create(&self, summary: &Summary) -> Result<Summary, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Summary>, AppError>;

    async fn list(&self, query: &SummaryListQuery) -> Result<(Vec<Summary>, i64), AppError>;

    /// Returns `false` when the row was not in `processing`. Content edited while
    /// the row was still `processing` is kept; only status and metadata change.
    async fn mark_completed(
        &self,
        id: Uuid,
        content: &str,
        metadata: serde_json::Value,
    ) -> Result<bool, AppError>;

    /// Returns `false` when the row was not in `processing`.
    async fn mark_failed(&self, id: Uuid, metadata: serde_json::Value) -> Result<bool, AppError>;

    /// Overwrite content and set `is_edited`; status is left alone.
    async fn update_content(&self, id: Uuid, content: &str) -> Result<Option<Summary>, AppError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct SummaryRepository {
    pool: PgPool,
}

impl SummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SummaryRepositoryTrait for SummaryRepository {
    #[tracing::instrument(skip(self, summary), fields(db.table = "summaries", db.operation = "insert", db.record_id = %summary.id))]
    async fn create(&self, summary: &Summary) -> Result<Summary, AppError> {
        let row = sqlx::query_as::<Postgres, Summary>(
            r#"
            INSERT INTO summaries (
                id, pdf_id, content, language, style, status, is_edited,
                metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, pdf_id, content, language, style, status, is_edited,
                      metadata, created_at, updated_at, deleted_at
            "#,
        )
        .bind(summary.id)
        .bind(summary.pdf_id)
        .bind(&summary.content)
        .bind(summary.language)
        .bind(summary.style)
        .bind(summary.status)
        .bind(summary.is_edited)
        .bind(&summary.metadata)
        .bind(summary.created_at)
        .bind(summary.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, summary_id = %summary.id, "Failed to insert summary");
            AppError::Database(e)
        })?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "summaries", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Summary>, AppError> {
        let row = sqlx::query_as::<Postgres, Summary>(
            r#"
            SELECT id, pdf_id, content, language, style, status, is_edited,
                   metadata, created_at, updated_at, deleted_at
            FROM summaries
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "summaries", db.operation = "select_list", pdf_id = %query.pdf_id))]
    async fn list(&self, query: &SummaryListQuery) -> Result<(Vec<Summary>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM summaries");
        push_summary_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM summaries", SUMMARY_COLUMNS));
        push_summary_filters(&mut qb, query);
        push_order_and_page(
            &mut qb,
            query.sort_by.column(),
            query.sort_order,
            query.page,
        );

        let rows = qb
            .build_query_as::<Summary>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    #[tracing::instrument(skip(self, content, metadata), fields(db.table = "summaries", db.operation = "update", db.record_id = %id))]
    async fn mark_completed(
        &self,
        id: Uuid,
        content: &str,
        metadata: serde_json::Value,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE summaries
            SET content = CASE WHEN is_edited THEN content ELSE $2 END,
                metadata = $3, status = 'completed', updated_at = NOW()
            WHERE id = $1 AND status = 'processing' AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(metadata)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, metadata), fields(db.table = "summaries", db.operation = "update", db.record_id = %id))]
    async fn mark_failed(&self, id: Uuid, metadata: serde_json::Value) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE summaries
            SET metadata = $2, status = 'failed', updated_at = NOW()
            WHERE id = $1 AND status = 'processing' AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(metadata)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "summaries", db.operation = "update", db.record_id = %id))]
    async fn update_content(&self, id: Uuid, content: &str) -> Result<Option<Summary>, AppError> {
        let row = sqlx::query_as::<Postgres, Summary>(
            r#"
            UPDATE summaries
            SET content = $2, is_edited = TRUE, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, pdf_id, content, language, style, status, is_edited,
                      metadata, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "summaries", db.operation = "soft_delete", db.record_id = %id))]
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE summaries
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
