use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfsum_core::models::{GenerateSummaryRequest, ListQueryParams, Summary, UpdateSummaryRequest};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{attachment, DataResponse, MessageResponse};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/pdfs/{id}/generate",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "PDF ID")),
    request_body = GenerateSummaryRequest,
    responses(
        (status = 201, description = "Summary generation started", body = Summary),
        (status = 400, description = "Invalid language or style", body = ErrorResponse),
        (status = 404, description = "PDF not found", body = ErrorResponse),
        (status = 503, description = "Summary queue is full", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Path(pdf_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<GenerateSummaryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let summary = state
        .summaries
        .create(pdf_id, request.language, request.style)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "Summary generation started",
            summary,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/pdfs/{id}/summaries",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "PDF ID"), ListQueryParams),
    responses(
        (status = 200, description = "Page of summaries, or a CSV/JSON file when `export` is set", body = [Summary]),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_summaries(
    State(state): State<Arc<AppState>>,
    Path(pdf_id): Path<Uuid>,
    ValidatedQuery(params): ValidatedQuery<ListQueryParams>,
) -> Result<Response, HttpAppError> {
    let query = params.summary_query(pdf_id)?;

    if let Some(format) = params.export {
        let file = state.summaries.export(&query, format).await?;
        return Ok(attachment(file));
    }

    let page = state.summaries.list(&query).await?;
    Ok(Json(page).into_response())
}

#[utoipa::path(
    get,
    path = "/v1/summary/{id}",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "Summary ID")),
    responses(
        (status = 200, description = "Summary", body = Summary),
        (status = 404, description = "Summary not found", body = ErrorResponse)
    )
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let summary = state.summaries.get(id).await?;
    Ok(Json(DataResponse::new(summary)))
}

#[utoipa::path(
    put,
    path = "/v1/summary/{id}",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "Summary ID")),
    request_body = UpdateSummaryRequest,
    responses(
        (status = 200, description = "Summary updated", body = MessageResponse),
        (status = 400, description = "Content is empty", body = ErrorResponse),
        (status = 404, description = "Summary not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateSummaryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    state.summaries.update(id, &request.content).await?;
    Ok(Json(MessageResponse::new("Summary updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/v1/summary/{id}",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "Summary ID")),
    responses(
        (status = 200, description = "Summary deleted", body = MessageResponse),
        (status = 404, description = "Summary not found", body = ErrorResponse)
    )
)]
pub async fn delete_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.summaries.delete(id).await?;
    Ok(Json(MessageResponse::new("Summary deleted successfully")))
}
