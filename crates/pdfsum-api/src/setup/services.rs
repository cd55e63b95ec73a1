//! Service initialization and application state setup

use anyhow::{Context, Result};
use pdfsum_core::Config;
use pdfsum_db::{
    DocumentRepository, DocumentRepositoryTrait, ProcessingLogRepository,
    ProcessingLogRepositoryTrait, SummaryRepository, SummaryRepositoryTrait,
};
use pdfsum_services::{
    AuditLogger, DocumentService, PdfValidator, Storage, SummarizerClient, SummaryJobQueue,
    SummaryService, SummaryWorker,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

/// Repository handles the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub documents: Arc<dyn DocumentRepositoryTrait>,
    pub summaries: Arc<dyn SummaryRepositoryTrait>,
    pub processing_logs: Arc<dyn ProcessingLogRepositoryTrait>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            summaries: Arc::new(SummaryRepository::new(pool.clone())),
            processing_logs: Arc::new(ProcessingLogRepository::new(pool.clone())),
        }
    }
}

/// Build the services and the summary worker pool, returning the application state.
///
/// Must be called from within a Tokio runtime: the job queue spawns its workers here.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
    repositories: Repositories,
) -> Result<Arc<AppState>> {
    let audit = AuditLogger::new(repositories.processing_logs.clone());

    let documents = DocumentService::new(
        repositories.documents.clone(),
        storage.clone(),
        PdfValidator::new(config.upload_limits().clone()),
        audit.clone(),
    );

    let client = SummarizerClient::new(config.summarizer())
        .context("Failed to initialize summarizer client")?;

    let worker = SummaryWorker::new(
        repositories.documents.clone(),
        repositories.summaries.clone(),
        storage.clone(),
        client,
        audit.clone(),
    );

    let summarizer = config.summarizer();
    let queue = SummaryJobQueue::new(
        Arc::new(worker),
        summarizer.max_concurrent,
        summarizer.queue_size,
    );

    tracing::info!(
        summarizer_url = %summarizer.base_url,
        timeout_secs = summarizer.timeout_secs,
        "Summarizer client configured"
    );

    let summaries = SummaryService::new(
        repositories.summaries,
        repositories.documents,
        audit,
        queue,
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        pool,
        storage,
        documents,
        summaries,
    )))
}
