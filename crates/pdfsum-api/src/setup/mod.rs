//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use pdfsum_core::Config;
use std::sync::Arc;

pub use services::Repositories;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let storage = pdfsum_services::create_storage(&config)
        .await
        .context("Failed to initialize upload storage")?;

    let state = services::initialize_services(
        &config,
        pool.clone(),
        storage,
        Repositories::postgres(&pool),
    )?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
