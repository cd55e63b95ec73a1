//! Application state shared by all handlers.

use pdfsum_core::Config;
use pdfsum_services::{DocumentService, Storage, SummaryService};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Used by the health check; repositories hold their own clones.
    pub pool: PgPool,
    pub storage: Arc<dyn Storage>,
    pub documents: DocumentService,
    pub summaries: SummaryService,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        storage: Arc<dyn Storage>,
        documents: DocumentService,
        summaries: SummaryService,
    ) -> Self {
        Self {
            config,
            pool,
            storage,
            documents,
            summaries,
        }
    }
}
