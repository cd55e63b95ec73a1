use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfsum_core::models::{DocumentResponse, ListQueryParams};
use std::sync::Arc;
use uuid::Uuid;

use super::{attachment, DataResponse, MessageResponse};
use crate::error::{ErrorResponse, HttpAppError, ValidatedQuery};
use crate::state::AppState;
use crate::utils::upload::spool_multipart_file;

#[utoipa::path(
    post,
    path = "/v1/pdfs/upload",
    tag = "pdfs",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "PDF in a field named `file`"),
    responses(
        (status = 201, description = "PDF uploaded successfully", body = DocumentResponse),
        (status = 400, description = "Missing file or failed validation", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = spool_multipart_file(multipart).await?;

    tracing::debug!(
        filename = %upload.filename,
        size_bytes = upload.size,
        "Received PDF upload"
    );

    let document = state
        .documents
        .create(upload.file, &upload.filename, upload.size)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "PDF uploaded successfully",
            DocumentResponse::from(document),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/pdfs",
    tag = "pdfs",
    params(ListQueryParams),
    responses(
        (status = 200, description = "Page of PDFs, or a CSV/JSON file when `export` is set", body = [DocumentResponse]),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_pdfs(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<ListQueryParams>,
) -> Result<Response, HttpAppError> {
    let query = params.document_query()?;

    if let Some(format) = params.export {
        let file = state.documents.export(&query, format).await?;
        return Ok(attachment(file));
    }

    let page = state.documents.list(&query).await?;
    Ok(Json(page.map(DocumentResponse::from)).into_response())
}

#[utoipa::path(
    get,
    path = "/v1/pdfs/{id}",
    tag = "pdfs",
    params(("id" = Uuid, Path, description = "PDF ID")),
    responses(
        (status = 200, description = "PDF metadata", body = DocumentResponse),
        (status = 404, description = "PDF not found", body = ErrorResponse)
    )
)]
pub async fn get_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state.documents.get(id).await?;
    Ok(Json(DataResponse::new(DocumentResponse::from(document))))
}

#[utoipa::path(
    delete,
    path = "/v1/pdfs/{id}",
    tag = "pdfs",
    params(("id" = Uuid, Path, description = "PDF ID")),
    responses(
        (status = 200, description = "PDF deleted", body = MessageResponse),
        (status = 404, description = "PDF not found", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn delete_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.documents.delete(id).await?;
    Ok(Json(MessageResponse::new("PDF deleted successfully")))
}
