//! OpenAPI documentation.
//! Paths are written with the `/v1` prefix; keep them in sync with `crate::constants::API_PREFIX`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use pdfsum_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PDF Summarizer API",
        version = "0.1.0",
        description = "Upload PDFs, generate summaries in a chosen language and style, and browse or export the results. All resource endpoints are versioned under /v1/."
    ),
    paths(
        // PDFs
        handlers::documents::upload_pdf,
        handlers::documents::list_pdfs,
        handlers::documents::get_pdf,
        handlers::documents::delete_pdf,
        // Summaries
        handlers::summaries::generate_summary,
        handlers::summaries::list_summaries,
        handlers::summaries::get_summary,
        handlers::summaries::update_summary,
        handlers::summaries::delete_summary,
    ),
    components(
        schemas(
            models::DocumentResponse,
            models::DocumentStatus,
            models::Summary,
            models::SummaryStatus,
            models::Language,
            models::SummaryStyle,
            models::GenerateSummaryRequest,
            models::UpdateSummaryRequest,
            models::PaginationMeta,
            models::SortOrder,
            models::ExportFormat,
            handlers::MessageResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "pdfs", description = "PDF upload, listing, export and deletion"),
        (name = "summaries", description = "Summary generation, editing, listing and export")
    )
)]
pub struct ApiDoc;
