//! Route configuration and setup.
//!
//! API routes are nested under [`API_PREFIX`]; health checks live in [health](health).

mod health;

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::error::set_production_mode;
use crate::handlers::{documents, summaries};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use pdfsum_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    set_production_mode(config.is_production());

    let cors = setup_cors(config)?;

    let body_limit = config.upload_limits().max_file_size as usize + MULTIPART_OVERHEAD_BYTES;

    let mut app = Router::new()
        .nest(API_PREFIX, api_routes())
        .route("/health", get(health::health_check))
        .nest_service("/uploads", ServeDir::new(config.upload_dir()));

    if config.is_production() {
        tracing::info!("API documentation disabled in production");
    } else {
        let openapi_path = format!("{}/openapi.json", API_PREFIX);
        let docs_path = format!("{}/docs", API_PREFIX);
        tracing::info!(docs = %docs_path, "Serving API documentation");
        app = app.merge(RapiDoc::with_openapi(openapi_path, ApiDoc::openapi()).path(docs_path));
    }

    let app = app
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pdfs/upload", post(documents::upload_pdf))
        .route("/pdfs", get(documents::list_pdfs))
        .route(
            "/pdfs/{id}",
            get(documents::get_pdf).delete(documents::delete_pdf),
        )
        .route("/pdfs/{id}/generate", post(summaries::generate_summary))
        .route("/pdfs/{id}/summaries", get(summaries::list_summaries))
        .route(
            "/summary/{id}",
            get(summaries::get_summary)
                .put(summaries::update_summary)
                .delete(summaries::delete_summary),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
