use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::submission::Submission;
use crate::state::AppState;
use crate::submissions::upload::read_submission_form;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: Uuid,
}

/// POST /submissions
pub async fn handle_create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let submission = read_submission_form(&mut multipart)
        .await?
        .into_submission()?;

    let id = state.store.insert(submission).await?;
    info!("Submission {id} created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Submission created",
            id,
        }),
    ))
}

/// GET /submissions
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// GET /submissions/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Submission>, AppError> {
    let submission = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
    Ok(Json(submission))
}

/// GET /submissions/:id/resume
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let resume = state
        .store
        .resume(&id)
        .await?
        .ok_or(AppError::ResumeNotFound)?;

    let disposition = content_disposition(&resume.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        resume.data,
    )
        .into_response())
}

/// Builds `attachment; filename="..."`. Characters a quoted header value
/// cannot carry (quotes, backslashes, controls, non-ASCII) and path
/// separators become `_`.
fn content_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"resume.pdf\""))
}
