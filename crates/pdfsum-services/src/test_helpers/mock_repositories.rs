//! In-memory repository implementations for testing
//!
//! These follow the PostgreSQL repositories' semantics (soft delete, filters,
//! sort with id tie-break, status guard on terminal transitions) without a database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use pdfsum_core::models::{
    Document, DocumentListQuery, DocumentSortField, DocumentStatus, EntityType, NewProcessingLog,
    PageRequest, ProcessingLog, SortOrder, Summary, SummaryListQuery, SummarySortField,
    SummaryStatus,
};
use pdfsum_core::AppError;
use pdfsum_db::{DocumentRepositoryTrait, ProcessingLogRepositoryTrait, SummaryRepositoryTrait};

fn simulated_failure() -> AppError {
    AppError::Internal("simulated database failure".to_string())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

fn paginate<T>(rows: Vec<T>, page: PageRequest) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect()
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Mock document repository for testing without database
#[derive(Clone, Default)]
pub struct InMemoryDocumentRepository {
    documents: Arc<Mutex<HashMap<Uuid, Document>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail with an internal error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// Every row, soft-deleted ones included.
    pub fn all(&self) -> Vec<Document> {
        self.documents.lock().unwrap().values().cloned().collect()
    }

    fn matches(document: &Document, query: &DocumentListQuery) -> bool {
        if document.deleted_at.is_some() {
            return false;
        }
        if let Some(search) = &query.search {
            if !contains_ignore_case(&document.original_name, search) {
                return false;
            }
        }
        if let Some(status) = query.status {
            if document.status != status {
                return false;
            }
        }
        if let Some(from) = query.date_from {
            if document.uploaded_at < day_start(from) {
                return false;
            }
        }
        if let Some(to) = query.date_to {
            if let Some(next) = to.succ_opt() {
                if document.uploaded_at >= day_start(next) {
                    return false;
                }
            }
        }
        true
    }

    fn compare(a: &Document, b: &Document, field: DocumentSortField) -> Ordering {
        let primary = match field {
            DocumentSortField::UploadedAt => a.uploaded_at.cmp(&b.uploaded_at),
            DocumentSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            DocumentSortField::OriginalName => a.original_name.cmp(&b.original_name),
            DocumentSortField::Status => a.status.to_string().cmp(&b.status.to_string()),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[async_trait]
impl DocumentRepositoryTrait for InMemoryDocumentRepository {
    async fn create(&self, document: &Document) -> Result<Document, AppError> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(simulated_failure());
        }
        self.documents
            .lock()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(document.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(&id)
            .filter(|d| d.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self, query: &DocumentListQuery) -> Result<(Vec<Document>, i64), AppError> {
        let mut rows: Vec<Document> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|d| Self::matches(d, query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| directed(Self::compare(a, b, query.sort_by), query.sort_order));

        let total = rows.len() as i64;
        Ok((paginate(rows, query.page), total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError> {
        let mut documents = self.documents.lock().unwrap();
        Ok(documents
            .get_mut(&id)
            .filter(|d| d.deleted_at.is_none())
            .map(|d| {
                d.status = status;
                d.updated_at = Utc::now();
                d.clone()
            }))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut documents = self.documents.lock().unwrap();
        match documents.get_mut(&id).filter(|d| d.deleted_at.is_none()) {
            Some(document) => {
                let now = Utc::now();
                document.deleted_at = Some(now);
                document.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Mock summary repository for testing without database
#[derive(Clone, Default)]
pub struct InMemorySummaryRepository {
    summaries: Arc<Mutex<HashMap<Uuid, Summary>>>,
}

impl InMemorySummaryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Summary> {
        self.summaries.lock().unwrap().values().cloned().collect()
    }

    fn matches(summary: &Summary, query: &SummaryListQuery) -> bool {
        summary.deleted_at.is_none()
            && summary.pdf_id == query.pdf_id
            && query
                .search
                .as_deref()
                .map_or(true, |s| contains_ignore_case(&summary.content, s))
            && query.status.map_or(true, |s| summary.status == s)
            && query.language.map_or(true, |l| summary.language == l)
            && query.style.map_or(true, |s| summary.style == s)
    }

    fn transition(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut Summary),
    ) -> Result<bool, AppError> {
        let mut summaries = self.summaries.lock().unwrap();
        match summaries
            .get_mut(&id)
            .filter(|s| s.deleted_at.is_none() && s.status == SummaryStatus::Processing)
        {
            Some(summary) => {
                apply(summary);
                summary.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SummaryRepositoryTrait for InMemorySummaryRepository {
    async fn create(&self, summary: &Summary) -> Result<Summary, AppError> {
        self.summaries
            .lock()
            .unwrap()
            .insert(summary.id, summary.clone());
        Ok(summary.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Summary>, AppError> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .get(&id)
            .filter(|s| s.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self, query: &SummaryListQuery) -> Result<(Vec<Summary>, i64), AppError> {
        let mut rows: Vec<Summary> = self
            .summaries
            .lock()
            .unwrap()
            .values()
            .filter(|s| Self::matches(s, query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let primary = match query.sort_by {
                SummarySortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SummarySortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            directed(primary.then_with(|| a.id.cmp(&b.id)), query.sort_order)
        });

        let total = rows.len() as i64;
        Ok((paginate(rows, query.page), total))
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        content: &str,
        metadata: serde_json::Value,
    ) -> Result<bool, AppError> {
        self.transition(id, |s| {
            if !s.is_edited {
                s.content = content.to_string();
            }
            s.metadata = Some(metadata);
            s.status = SummaryStatus::Completed;
        })
    }

    async fn mark_failed(&self, id: Uuid, metadata: serde_json::Value) -> Result<bool, AppError> {
        self.transition(id, |s| {
            s.metadata = Some(metadata);
            s.status = SummaryStatus::Failed;
        })
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<Option<Summary>, AppError> {
        let mut summaries = self.summaries.lock().unwrap();
        Ok(summaries
            .get_mut(&id)
            .filter(|s| s.deleted_at.is_none())
            .map(|s| {
                s.content = content.to_string();
                s.is_edited = true;
                s.updated_at = Utc::now();
                s.clone()
            }))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut summaries = self.summaries.lock().unwrap();
        match summaries.get_mut(&id).filter(|s| s.deleted_at.is_none()) {
            Some(summary) => {
                let now = Utc::now();
                summary.deleted_at = Some(now);
                summary.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Mock audit log keeping events in insertion order
#[derive(Clone, Default)]
pub struct InMemoryProcessingLogRepository {
    logs: Arc<Mutex<Vec<ProcessingLog>>>,
    fail_inserts: Arc<AtomicBool>,
}

impl InMemoryProcessingLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `insert` fail with an internal error.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn all(&self) -> Vec<ProcessingLog> {
        self.logs.lock().unwrap().clone()
    }

    /// Events for `entity_id` regardless of entity type.
    pub fn for_entity(&self, entity_id: Uuid) -> Vec<ProcessingLog> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.entity_id == entity_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProcessingLogRepositoryTrait for InMemoryProcessingLogRepository {
    async fn insert(&self, log: NewProcessingLog) -> Result<ProcessingLog, AppError> {
        if self.fail_inserts.load(AtomicOrdering::SeqCst) {
            return Err(simulated_failure());
        }
        let log = log.into_log();
        self.logs.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn list_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<ProcessingLog>, AppError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.entity_type == entity_type && l.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
