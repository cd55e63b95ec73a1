use pdfsum_core::models::{Document, DocumentListQuery, DocumentStatus};
use pdfsum_core::AppError;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::query::{push_document_filters, push_order_and_page};

const DOCUMENT_COLUMNS: &str = "id, filename, original_name, file_path, file_size, mime_type, \
     status, uploaded_at, updated_at, deleted_at";

/// Trait for document metadata persistence
#[async_trait::async_trait]
pub trait DocumentRepositoryTrait: Send + Sync {
    async fn create(&self, document: &Document) -> Result<Document, AppError>;

    /// Soft-deleted rows are treated as absent.
    async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Matching page plus the total count under the same filters.
    async fn list(&self, query: &DocumentListQuery) -> Result<(Vec<Document>, i64), AppError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError>;

    /// Returns `false` when no live row matched.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DocumentRepositoryTrait for DocumentRepository {
    #[tracing::instrument(skip(self, document), fields(db.table = "pdf_documents", db.operation = "insert", db.record_id = %document.id))]
    async fn create(&self, document: &Document) -> Result<Document, AppError> {
        let row = sqlx::query_as::<Postgres, Document>(
            r#"
            INSERT INTO pdf_documents (
                id, filename, original_name, file_path, file_size, mime_type,
                status, uploaded_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, filename, original_name, file_path, file_size, mime_type,
                      status, uploaded_at, updated_at, deleted_at
            "#,
        )
        .bind(document.id)
        .bind(&document.filename)
        .bind(&document.original_name)
        .bind(&document.file_path)
        .bind(document.file_size)
        .bind(&document.mime_type)
        .bind(document.status)
        .bind(document.uploaded_at)
        .bind(document.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, document_id = %document.id, "Failed to insert document");
            AppError::Database(e)
        })?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdf_documents", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, Document>(
            r#"
            SELECT id, filename, original_name, file_path, file_size, mime_type,
                   status, uploaded_at, updated_at, deleted_at
            FROM pdf_documents
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdf_documents", db.operation = "select_list"))]
    async fn list(&self, query: &DocumentListQuery) -> Result<(Vec<Document>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pdf_documents");
        push_document_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM pdf_documents",
            DOCUMENT_COLUMNS
        ));
        push_document_filters(&mut qb, query);
        push_order_and_page(
            &mut qb,
            query.sort_by.column(),
            query.sort_order,
            query.page,
        );

        let rows = qb
            .build_query_as::<Document>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(total = total, returned = rows.len(), "Listed documents");

        Ok((rows, total))
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdf_documents", db.operation = "update", db.record_id = %id))]
    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, Document>(
            r#"
            UPDATE pdf_documents
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, filename, original_name, file_path, file_size, mime_type,
                      status, uploaded_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdf_documents", db.operation = "soft_delete", db.record_id = %id))]
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE pdf_documents
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
