//! Batch file handlers.
//!
//! Thin proxies over the batch file service: signed-url generation, file
//! listing/deletion and per-user job queries. The source path segment is
//! validated here; everything else passes through.

use crate::errors::BffError;
use crate::models::{AuthContext, BatchSource};
use crate::routes::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Rejection message for an unknown source segment.
const INVALID_SOURCE_MESSAGE: &str = "Invalid S3 bucket source";

/// Parse the `{source}` path segment or reject with 400.
fn parse_source(segment: &str) -> Result<BatchSource, BffError> {
    BatchSource::parse(segment)
        .ok_or_else(|| BffError::BadRequest(INVALID_SOURCE_MESSAGE.to_string()))
}

/// Handler for POST /v1/pci-bff/batch/signed-url/{source}
///
/// # Errors
///
/// - 400 for an unknown source segment or a failing batch API
#[instrument(skip_all, name = "bff.handlers.batch_signed_urls")]
pub async fn batch_signed_urls(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, BffError> {
    let source = parse_source(&source)?;
    let data = state.batch_client.signed_urls(source, &body).await?;
    Ok(Json(data))
}

/// Handler for GET /v1/pci-bff/batch/files/{source}
///
/// # Errors
///
/// - 400 for an unknown source segment or a failing batch API
#[instrument(skip_all, name = "bff.handlers.batch_list_files")]
pub async fn batch_list_files(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<Json<serde_json::Value>, BffError> {
    let source = parse_source(&source)?;
    let data = state.batch_client.list_files(source).await?;
    Ok(Json(data))
}

/// Handler for DELETE /v1/pci-bff/batch/files/{source}
///
/// # Errors
///
/// - 400 for an unknown source segment or a failing batch API
#[instrument(skip_all, name = "bff.handlers.batch_delete_files")]
pub async fn batch_delete_files(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, BffError> {
    let source = parse_source(&source)?;
    let data = state.batch_client.delete_files(source, &body).await?;
    Ok(Json(data))
}

/// Handler for GET /v1/pci-bff/batch/jobs
///
/// Jobs are scoped to the authenticated caller's username.
///
/// # Errors
///
/// - 401 when the context unexpectedly carries no username
/// - 400 when the batch API fails
#[instrument(skip_all, name = "bff.handlers.batch_list_jobs")]
pub async fn batch_list_jobs(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<serde_json::Value>, BffError> {
    let username = context.outcome.username.as_deref().ok_or_else(|| {
        BffError::Unauthenticated("User cannot be authenticated".to_string())
    })?;

    let data = state.batch_client.list_jobs(username).await?;
    Ok(Json(data))
}
