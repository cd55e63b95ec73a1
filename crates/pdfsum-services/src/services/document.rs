use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncSeek};
use uuid::Uuid;

use pdfsum_core::models::{
    AuditAction, AuditStatus, Document, DocumentListQuery, DocumentStatus, EntityType,
    ExportFormat, Paginated, PaginationMeta,
};
use pdfsum_core::AppError;
use pdfsum_db::DocumentRepositoryTrait;
use pdfsum_processing::{sanitize_filename, PdfValidator};
use pdfsum_storage::{generate_storage_key, Storage};

use super::audit::AuditLogger;
use super::export::{ExportFile, Exporter};

/// Owns the PDF lifecycle: validated upload to disk plus metadata row, lookup,
/// listing, and deletion.
#[derive(Clone)]
pub struct DocumentService {
    repository: Arc<dyn DocumentRepositoryTrait>,
    storage: Arc<dyn Storage>,
    validator: PdfValidator,
    audit: AuditLogger,
}

impl DocumentService {
    pub fn new(
        repository: Arc<dyn DocumentRepositoryTrait>,
        storage: Arc<dyn Storage>,
        validator: PdfValidator,
        audit: AuditLogger,
    ) -> Self {
        Self {
            repository,
            storage,
            validator,
            audit,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Validate and store an uploaded PDF.
    ///
    /// Nothing is written when validation fails. Any later failure removes the
    /// file written so far.
    #[tracing::instrument(skip(self, reader), fields(document_id = tracing::field::Empty, size_bytes = declared_size))]
    pub async fn create<R>(
        &self,
        mut reader: R,
        declared_name: &str,
        declared_size: u64,
    ) -> Result<Document, AppError>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin + 'static,
    {
        let start = std::time::Instant::now();
        let id = Uuid::new_v4();
        tracing::Span::current().record("document_id", tracing::field::display(id));

        self.audit
            .record(
                EntityType::Pdf,
                id,
                AuditAction::Upload,
                AuditStatus::Started,
                "Starting PDF upload",
                Some(json!({ "filename": declared_name, "size": declared_size })),
            )
            .await;

        if let Err(e) = self
            .validator
            .validate(declared_name, declared_size, &mut reader)
            .await
        {
            self.audit
                .record(
                    EntityType::Pdf,
                    id,
                    AuditAction::Upload,
                    AuditStatus::Failed,
                    "PDF validation failed",
                    Some(json!({
                        "error": e.to_string(),
                        "stage": e.stage(),
                        "filename": declared_name,
                        "size": declared_size,
                    })),
                )
                .await;
            return Err(e.into());
        }

        let sanitized_name = sanitize_filename(declared_name);
        let storage_key = generate_storage_key(id, &sanitized_name);
        let file_path = match self.storage.file_path(&storage_key) {
            Ok(path) => path,
            Err(e) => {
                self.fail_upload(id, "Failed to resolve storage path", json!({ "error": e.to_string() }))
                    .await;
                return Err(e.into());
            }
        };

        let written = match self
            .storage
            .upload_stream(&storage_key, Box::pin(reader))
            .await
        {
            Ok(written) => written,
            Err(e) => {
                self.discard_file(&storage_key).await;
                self.fail_upload(id, "Failed to save file content", json!({ "error": e.to_string() }))
                    .await;
                return Err(e.into());
            }
        };

        if written != declared_size {
            self.discard_file(&storage_key).await;
            self.fail_upload(
                id,
                "File size mismatch",
                json!({ "expected": declared_size, "actual": written }),
            )
            .await;
            return Err(AppError::Storage(format!(
                "file size mismatch: expected {} bytes, wrote {}",
                declared_size, written
            )));
        }

        let now = Utc::now();
        let document = Document {
            id,
            filename: storage_key.clone(),
            original_name: sanitized_name.clone(),
            file_path: file_path.clone(),
            file_size: written as i64,
            mime_type: self.validator.limits().allowed_mime_type.clone(),
            status: DocumentStatus::Pending,
            uploaded_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let document = match self.repository.create(&document).await {
            Ok(document) => document,
            Err(e) => {
                self.discard_file(&storage_key).await;
                self.fail_upload(
                    id,
                    "Failed to create PDF record in database",
                    json!({ "error": e.to_string() }),
                )
                .await;
                return Err(e);
            }
        };

        self.audit
            .record(
                EntityType::Pdf,
                id,
                AuditAction::Upload,
                AuditStatus::Success,
                "PDF uploaded successfully",
                Some(json!({
                    "filename": declared_name,
                    "size": written,
                    "sanitized_name": sanitized_name,
                    "file_path": file_path,
                })),
            )
            .await;

        tracing::info!(
            document_id = %id,
            size_bytes = written,
            duration_ms = start.elapsed().as_millis() as u64,
            "PDF stored"
        );

        Ok(document)
    }

    pub async fn get(&self, id: Uuid) -> Result<Document, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))
    }

    pub async fn list(&self, query: &DocumentListQuery) -> Result<Paginated<Document>, AppError> {
        let (rows, total) = self.repository.list(query).await?;
        let meta = PaginationMeta::new(query.page.page, query.page.limit, total);
        Ok(Paginated::new(rows, meta))
    }

    /// Full filtered and sorted result set rendered as a file.
    pub async fn export(
        &self,
        query: &DocumentListQuery,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let (rows, total) = self.repository.list(query).await?;
        tracing::info!(rows = rows.len(), total = total, format = format.extension(), "Exporting documents");
        Exporter::documents(rows, format, Utc::now())
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Document, AppError> {
        self.repository
            .update_status(id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))
    }

    /// Soft-delete the row, then remove the file. A file removal failure is only
    /// logged since the row decides whether the document exists.
    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let document = self.get(id).await?;

        self.audit
            .record(
                EntityType::Pdf,
                id,
                AuditAction::Delete,
                AuditStatus::Started,
                "Starting PDF deletion",
                None,
            )
            .await;

        match self.repository.soft_delete(id).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(AppError::NotFound("PDF not found".to_string()));
            }
            Err(e) => {
                self.audit
                    .record(
                        EntityType::Pdf,
                        id,
                        AuditAction::Delete,
                        AuditStatus::Failed,
                        "Failed to delete PDF record",
                        Some(json!({ "error": e.to_string() })),
                    )
                    .await;
                return Err(e);
            }
        }

        if let Err(e) = self.storage.delete(&document.filename).await {
            tracing::warn!(
                document_id = %id,
                filename = %document.filename,
                error = %e,
                "Failed to remove PDF file from disk"
            );
        }

        self.audit
            .record(
                EntityType::Pdf,
                id,
                AuditAction::Delete,
                AuditStatus::Success,
                "PDF deleted successfully",
                None,
            )
            .await;

        Ok(())
    }

    async fn discard_file(&self, storage_key: &str) {
        if let Err(e) = self.storage.delete(storage_key).await {
            tracing::warn!(key = %storage_key, error = %e, "Failed to remove partial upload");
        }
    }

    async fn fail_upload(&self, id: Uuid, message: &str, metadata: serde_json::Value) {
        self.audit
            .record(
                EntityType::Pdf,
                id,
                AuditAction::Upload,
                AuditStatus::Failed,
                message,
                Some(metadata),
            )
            .await;
    }
}
