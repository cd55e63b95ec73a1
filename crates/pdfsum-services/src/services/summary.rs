use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use pdfsum_core::models::{
    AuditAction, AuditStatus, EntityType, ExportFormat, Language, Paginated, PaginationMeta,
    Summary, SummaryListQuery, SummaryStyle,
};
use pdfsum_core::AppError;
use pdfsum_db::{DocumentRepositoryTrait, SummaryRepositoryTrait};
use pdfsum_storage::Storage;

use super::audit::AuditLogger;
use super::export::{ExportFile, Exporter};
use super::extraction::extract_content;
use super::summarizer::{SummarizeRequest, SummarizerClient};
use crate::job_queue::{JobOutcome, QueueError, SummaryJob, SummaryJobHandler, SummaryJobQueue};

const MISSING_CONTENT: &str = "AI response missing or empty content";

/// Runs one summary job: load the PDF, call the summarizer, persist the result.
///
/// Every failure path marks the summary `failed` with an `error` entry in its
/// metadata and writes exactly one `generate/failed` audit event.
pub struct SummaryWorker {
    documents: Arc<dyn DocumentRepositoryTrait>,
    summaries: Arc<dyn SummaryRepositoryTrait>,
    storage: Arc<dyn Storage>,
    client: SummarizerClient,
    audit: AuditLogger,
}

impl SummaryWorker {
    pub fn new(
        documents: Arc<dyn DocumentRepositoryTrait>,
        summaries: Arc<dyn SummaryRepositoryTrait>,
        storage: Arc<dyn Storage>,
        client: SummarizerClient,
        audit: AuditLogger,
    ) -> Self {
        Self {
            documents,
            summaries,
            storage,
            client,
            audit,
        }
    }

    async fn fail(&self, summary_id: Uuid, message: &str, error: Option<String>) -> JobOutcome {
        let detail = error.clone().unwrap_or_else(|| message.to_string());

        match self
            .summaries
            .mark_failed(summary_id, json!({ "error": detail }))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(summary_id = %summary_id, "Summary already terminal, failure not recorded");
            }
            Err(e) => {
                tracing::error!(summary_id = %summary_id, error = %e, "Failed to mark summary as failed");
            }
        }

        let metadata = error.map(|e| json!({ "error": e }));
        self.audit
            .record(
                EntityType::Summary,
                summary_id,
                AuditAction::Generate,
                AuditStatus::Failed,
                message,
                metadata,
            )
            .await;

        JobOutcome::Failed(detail)
    }
}

#[async_trait::async_trait]
impl SummaryJobHandler for SummaryWorker {
    #[tracing::instrument(skip(self), fields(summary_id = %job.summary_id, pdf_id = %job.pdf_id))]
    async fn handle(&self, job: SummaryJob) -> JobOutcome {
        let start = std::time::Instant::now();

        let document = match self.documents.get(job.pdf_id).await {
            Ok(Some(document)) => document,
            Ok(None) => return self.fail(job.summary_id, "PDF not found", None).await,
            Err(e) => {
                return self
                    .fail(job.summary_id, "PDF not found", Some(e.to_string()))
                    .await
            }
        };

        let file_bytes = match self.storage.download(&document.filename).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return self
                    .fail(job.summary_id, "Failed to open PDF", Some(e.to_string()))
                    .await
            }
        };

        let request = SummarizeRequest {
            file_bytes,
            filename: document.original_name.clone(),
            language: job.language,
            style: job.style,
        };

        let body = match self.client.summarize(request).await {
            Ok(body) => body,
            Err(e) => return self.fail(job.summary_id, e.kind(), Some(e.detail())).await,
        };

        let extracted = match extract_content(&body) {
            Ok(extracted) => extracted,
            Err(_) => {
                return self
                    .fail(job.summary_id, MISSING_CONTENT, Some(MISSING_CONTENT.to_string()))
                    .await
            }
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        let metadata = json!({
            "processing_time_ms": processing_time_ms,
            "ai_model": body.get("model").cloned().unwrap_or(serde_json::Value::Null),
        });

        match self
            .summaries
            .mark_completed(job.summary_id, &extracted.content, metadata)
            .await
        {
            Ok(true) => {
                self.audit
                    .record(
                        EntityType::Summary,
                        job.summary_id,
                        AuditAction::Generate,
                        AuditStatus::Completed,
                        "Summary generated successfully",
                        Some(json!({
                            "content_length": extracted.content.chars().count(),
                            "processing_time_ms": processing_time_ms,
                            "strategy": extracted.strategy,
                        })),
                    )
                    .await;
                JobOutcome::Completed
            }
            Ok(false) => {
                tracing::warn!(
                    summary_id = %job.summary_id,
                    "Summary left processing state before completion, result discarded"
                );
                JobOutcome::Failed("summary no longer processing".to_string())
            }
            Err(e) => {
                self.audit
                    .record(
                        EntityType::Summary,
                        job.summary_id,
                        AuditAction::Generate,
                        AuditStatus::Failed,
                        "Failed to update summary",
                        Some(json!({ "error": e.to_string() })),
                    )
                    .await;
                JobOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Summary lifecycle as seen by callers: start generation, read, edit, delete
#[derive(Clone)]
pub struct SummaryService {
    repository: Arc<dyn SummaryRepositoryTrait>,
    documents: Arc<dyn DocumentRepositoryTrait>,
    audit: AuditLogger,
    queue: SummaryJobQueue,
}

impl SummaryService {
    pub fn new(
        repository: Arc<dyn SummaryRepositoryTrait>,
        documents: Arc<dyn DocumentRepositoryTrait>,
        audit: AuditLogger,
        queue: SummaryJobQueue,
    ) -> Self {
        Self {
            repository,
            documents,
            audit,
            queue,
        }
    }

    /// Persist a `processing` summary and queue its generation.
    ///
    /// The row is stored before the job is submitted, so it is visible as soon as
    /// this returns. A full queue marks the row `failed` and returns 503.
    #[tracing::instrument(skip(self), fields(pdf_id = %pdf_id, summary_id = tracing::field::Empty))]
    pub async fn create(
        &self,
        pdf_id: Uuid,
        language: Language,
        style: SummaryStyle,
    ) -> Result<Summary, AppError> {
        if self.documents.get(pdf_id).await?.is_none() {
            return Err(AppError::NotFound("PDF not found".to_string()));
        }

        let id = Uuid::new_v4();
        tracing::Span::current().record("summary_id", tracing::field::display(id));

        self.audit
            .record(
                EntityType::Summary,
                id,
                AuditAction::Generate,
                AuditStatus::Started,
                "Starting summary generation",
                Some(json!({
                    "pdf_id": pdf_id,
                    "language": language,
                    "style": style,
                })),
            )
            .await;

        let summary = Summary::processing(id, pdf_id, language, style);
        let summary = match self.repository.create(&summary).await {
            Ok(summary) => summary,
            Err(e) => {
                self.audit
                    .record(
                        EntityType::Summary,
                        id,
                        AuditAction::Generate,
                        AuditStatus::Failed,
                        "Failed to create summary record",
                        Some(json!({ "error": e.to_string() })),
                    )
                    .await;
                return Err(e);
            }
        };

        let job = SummaryJob {
            summary_id: id,
            pdf_id,
            language,
            style,
        };

        if let Err(e) = self.queue.submit(job) {
            let reason = e.to_string();
            if let Err(mark_err) = self
                .repository
                .mark_failed(id, json!({ "error": reason }))
                .await
            {
                tracing::error!(summary_id = %id, error = %mark_err, "Failed to mark rejected summary as failed");
            }

            self.audit
                .record(
                    EntityType::Summary,
                    id,
                    AuditAction::Generate,
                    AuditStatus::Failed,
                    "Summary job rejected",
                    Some(json!({ "error": reason })),
                )
                .await;

            return Err(match e {
                QueueError::Full => AppError::ServiceUnavailable(reason),
                QueueError::Closed => AppError::Internal(reason),
            });
        }

        Ok(summary)
    }

    pub async fn get(&self, id: Uuid) -> Result<Summary, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Summary not found".to_string()))
    }

    pub async fn list(&self, query: &SummaryListQuery) -> Result<Paginated<Summary>, AppError> {
        let (rows, total) = self.repository.list(query).await?;
        let meta = PaginationMeta::new(query.page.page, query.page.limit, total);
        Ok(Paginated::new(rows, meta))
    }

    pub async fn export(
        &self,
        query: &SummaryListQuery,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let (rows, total) = self.repository.list(query).await?;
        tracing::info!(pdf_id = %query.pdf_id, rows = rows.len(), total = total, "Exporting summaries");
        Exporter::summaries(rows, format, Utc::now())
    }

    /// Overwrite the content and flag the summary as edited. Status is unchanged.
    pub async fn update(&self, id: Uuid, content: &str) -> Result<Summary, AppError> {
        self.repository
            .update_content(id, content)
            .await?
            .ok_or_else(|| AppError::NotFound("Summary not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repository.soft_delete(id).await? {
            return Err(AppError::NotFound("Summary not found".to_string()));
        }
        tracing::info!(summary_id = %id, "Summary deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        pdf_bytes, InMemoryDocumentRepository, InMemoryProcessingLogRepository,
        InMemorySummaryRepository,
    };
    use pdfsum_core::models::{Document, DocumentStatus, SummaryStatus};
    use pdfsum_core::SummarizerConfig;
    use pdfsum_storage::LocalStorage;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        documents: Arc<InMemoryDocumentRepository>,
        summaries: Arc<InMemorySummaryRepository>,
        logs: Arc<InMemoryProcessingLogRepository>,
        storage: Arc<LocalStorage>,
        _dir: TempDir,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let storage = Arc::new(LocalStorage::new(dir.path().to_path_buf()).await.unwrap());
            Self {
                documents: Arc::new(InMemoryDocumentRepository::new()),
                summaries: Arc::new(InMemorySummaryRepository::new()),
                logs: Arc::new(InMemoryProcessingLogRepository::new()),
                storage,
                _dir: dir,
            }
        }

        fn worker(&self, base_url: &str) -> SummaryWorker {
            let client = SummarizerClient::new(&SummarizerConfig {
                base_url: base_url.to_string(),
                timeout_secs: 5,
                max_concurrent: 1,
                queue_size: 1,
            })
            .unwrap();
            SummaryWorker::new(
                self.documents.clone(),
                self.summaries.clone(),
                self.storage.clone(),
                client,
                AuditLogger::new(self.logs.clone()),
            )
        }

        fn service(&self, queue: SummaryJobQueue) -> SummaryService {
            SummaryService::new(
                self.summaries.clone(),
                self.documents.clone(),
                AuditLogger::new(self.logs.clone()),
                queue,
            )
        }

        async fn stored_document(&self) -> Document {
            let id = Uuid::new_v4();
            let filename = format!("{}_paper.pdf", id);
            self.storage
                .upload_stream(&filename, Box::pin(std::io::Cursor::new(pdf_bytes(2048))))
                .await
                .unwrap();
            let now = Utc::now();
            let document = Document {
                id,
                filename: filename.clone(),
                original_name: "paper.pdf".to_string(),
                file_path: filename,
                file_size: 2048,
                mime_type: "application/pdf".to_string(),
                status: DocumentStatus::Pending,
                uploaded_at: now,
                updated_at: now,
                deleted_at: None,
            };
            self.documents.create(&document).await.unwrap()
        }

        async fn processing_summary(&self, pdf_id: Uuid) -> Summary {
            let summary = Summary::processing(Uuid::new_v4(), pdf_id, Language::En, SummaryStyle::Simple);
            self.summaries.create(&summary).await.unwrap()
        }

        fn job(summary: &Summary) -> SummaryJob {
            SummaryJob {
                summary_id: summary.id,
                pdf_id: summary.pdf_id,
                language: summary.language,
                style: summary.style,
            }
        }

        fn failed_events(&self, summary_id: Uuid) -> Vec<pdfsum_core::models::ProcessingLog> {
            self.logs
                .for_entity(summary_id)
                .into_iter()
                .filter(|l| l.status == AuditStatus::Failed)
                .collect()
        }
    }

    async fn mock_response(status: usize, body: &str) -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/summarize")
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn test_worker_completes_summary() {
        let f = Fixture::new().await;
        let server = mock_response(200, r#"{"content":"hello","model":"m-1"}"#).await;
        let doc = f.stored_document().await;
        let summary = f.processing_summary(doc.id).await;

        let outcome = f.worker(&server.url()).handle(Fixture::job(&summary)).await;
        assert_eq!(outcome, JobOutcome::Completed);

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::Completed);
        assert_eq!(stored.content, "hello");
        let meta = stored.metadata.unwrap();
        assert_eq!(meta["ai_model"], "m-1");
        assert!(meta["processing_time_ms"].is_u64());

        let last = f.logs.for_entity(summary.id).pop().unwrap();
        assert_eq!(last.status, AuditStatus::Completed);
        assert_eq!(last.metadata.unwrap()["content_length"], 5);
    }

    #[tokio::test]
    async fn test_worker_nested_fallback_and_missing_model() {
        let f = Fixture::new().await;
        let server = mock_response(200, r#"{"data":{"summary":"x"}}"#).await;
        let doc = f.stored_document().await;
        let summary = f.processing_summary(doc.id).await;

        f.worker(&server.url()).handle(Fixture::job(&summary)).await;

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "x");
        assert!(stored.metadata.unwrap()["ai_model"].is_null());
    }

    #[tokio::test]
    async fn test_worker_fails_on_missing_content() {
        let f = Fixture::new().await;
        let server = mock_response(200, "{}").await;
        let doc = f.stored_document().await;
        let summary = f.processing_summary(doc.id).await;

        let outcome = f.worker(&server.url()).handle(Fixture::job(&summary)).await;
        assert!(matches!(outcome, JobOutcome::Failed(_)));

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::Failed);
        assert!(stored.content.is_empty());
        assert_eq!(
            stored.metadata.unwrap()["error"],
            "AI response missing or empty content"
        );
        assert_eq!(f.failed_events(summary.id).len(), 1);
    }

    #[tokio::test]
    async fn test_worker_fails_on_error_status() {
        let f = Fixture::new().await;
        let server = mock_response(503, "").await;
        let doc = f.stored_document().await;
        let summary = f.processing_summary(doc.id).await;

        f.worker(&server.url()).handle(Fixture::job(&summary)).await;

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::Failed);
        assert_eq!(stored.metadata.unwrap()["error"], "AI returned status 503");

        let failed = f.failed_events(summary.id);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].message, "AI service error");
    }

    #[tokio::test]
    async fn test_worker_fails_when_document_missing() {
        let f = Fixture::new().await;
        let summary = f.processing_summary(Uuid::new_v4()).await;

        let outcome = f
            .worker("http://127.0.0.1:9")
            .handle(Fixture::job(&summary))
            .await;
        assert_eq!(outcome, JobOutcome::Failed("PDF not found".to_string()));

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::Failed);
        assert_eq!(f.failed_events(summary.id).len(), 1);
    }

    #[tokio::test]
    async fn test_worker_fails_when_file_missing() {
        let f = Fixture::new().await;
        let doc = f.stored_document().await;
        f.storage.delete(&doc.filename).await.unwrap();
        let summary = f.processing_summary(doc.id).await;

        f.worker("http://127.0.0.1:9")
            .handle(Fixture::job(&summary))
            .await;

        let failed = f.failed_events(summary.id);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].message, "Failed to open PDF");
    }

    #[tokio::test]
    async fn test_terminal_status_is_not_overwritten() {
        let f = Fixture::new().await;
        let server = mock_response(200, r#"{"content":"late"}"#).await;
        let doc = f.stored_document().await;
        let summary = f.processing_summary(doc.id).await;
        f.summaries
            .mark_failed(summary.id, json!({"error": "earlier"}))
            .await
            .unwrap();

        f.worker(&server.url()).handle(Fixture::job(&summary)).await;

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::Failed);
        assert!(stored.content.is_empty());
    }

    #[tokio::test]
    async fn test_completion_keeps_edit_made_while_processing() {
        let f = Fixture::new().await;
        let server = mock_response(200, r#"{"content":"generated","model":"m-1"}"#).await;
        let doc = f.stored_document().await;
        let summary = f.processing_summary(doc.id).await;
        f.summaries
            .update_content(summary.id, "written by hand")
            .await
            .unwrap();

        let outcome = f.worker(&server.url()).handle(Fixture::job(&summary)).await;
        assert_eq!(outcome, JobOutcome::Completed);

        let stored = f.summaries.get(summary.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SummaryStatus::Completed);
        assert!(stored.is_edited);
        assert_eq!(stored.content, "written by hand");
        assert_eq!(stored.metadata.unwrap()["ai_model"], "m-1");
    }

    #[tokio::test]
    async fn test_create_returns_processing_and_completes_in_background() {
        let f = Fixture::new().await;
        let server = mock_response(200, r#"{"summary":"done"}"#).await;
        let doc = f.stored_document().await;
        let queue = SummaryJobQueue::new(Arc::new(f.worker(&server.url())), 2, 10);
        let service = f.service(queue);

        let summary = service
            .create(doc.id, Language::Id, SummaryStyle::Professional)
            .await
            .unwrap();
        assert_eq!(summary.status, SummaryStatus::Processing);
        assert!(summary.content.is_empty());

        let mut stored = service.get(summary.id).await.unwrap();
        for _ in 0..200 {
            if stored.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            stored = service.get(summary.id).await.unwrap();
        }
        assert_eq!(stored.status, SummaryStatus::Completed);
        assert_eq!(stored.content, "done");

        let started = &f.logs.for_entity(summary.id)[0];
        assert_eq!(started.status, AuditStatus::Started);
        assert_eq!(started.metadata.as_ref().unwrap()["language"], "ID");
    }

    #[tokio::test]
    async fn test_create_unknown_document_is_not_found() {
        let f = Fixture::new().await;
        let queue = SummaryJobQueue::new(Arc::new(f.worker("http://127.0.0.1:9")), 1, 1);
        let service = f.service(queue);

        let err = service
            .create(Uuid::new_v4(), Language::En, SummaryStyle::Simple)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "PDF not found"));
        assert!(f.summaries.all().is_empty());
    }

    struct StuckHandler;

    #[async_trait::async_trait]
    impl SummaryJobHandler for StuckHandler {
        async fn handle(&self, _job: SummaryJob) -> JobOutcome {
            std::future::pending::<()>().await;
            JobOutcome::Completed
        }
    }

    #[tokio::test]
    async fn test_full_queue_marks_summary_failed() {
        let f = Fixture::new().await;
        let doc = f.stored_document().await;
        let service = f.service(SummaryJobQueue::new(Arc::new(StuckHandler), 1, 1));

        // One running, one held by the dispatcher, one in the channel
        for _ in 0..3 {
            service
                .create(doc.id, Language::En, SummaryStyle::Simple)
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let err = service
            .create(doc.id, Language::En, SummaryStyle::Simple)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(ref m) if m == "summary queue is full"));

        let rejected = f
            .summaries
            .all()
            .into_iter()
            .find(|s| s.status == SummaryStatus::Failed)
            .unwrap();
        assert_eq!(rejected.metadata.unwrap()["error"], "summary queue is full");
        assert_eq!(f.failed_events(rejected.id).len(), 1);
    }

    #[tokio::test]
    async fn test_update_sets_edited_and_keeps_status() {
        let f = Fixture::new().await;
        let queue = SummaryJobQueue::new(Arc::new(f.worker("http://127.0.0.1:9")), 1, 1);
        let service = f.service(queue);
        let summary = f.processing_summary(Uuid::new_v4()).await;
        f.summaries
            .mark_completed(summary.id, "original", json!({}))
            .await
            .unwrap();

        let updated = service.update(summary.id, "new text").await.unwrap();
        assert!(updated.is_edited);
        assert_eq!(updated.content, "new text");
        assert_eq!(updated.status, SummaryStatus::Completed);

        assert!(matches!(
            service.update(Uuid::new_v4(), "x").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_summary() {
        let f = Fixture::new().await;
        let queue = SummaryJobQueue::new(Arc::new(f.worker("http://127.0.0.1:9")), 1, 1);
        let service = f.service(queue);
        let summary = f.processing_summary(Uuid::new_v4()).await;

        service.delete(summary.id).await.unwrap();
        assert!(matches!(service.get(summary.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(summary.id).await, Err(AppError::NotFound(_))));
    }
}
