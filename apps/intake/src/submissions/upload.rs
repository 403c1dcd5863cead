use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::errors::AppError;
use crate::models::submission::NewSubmission;

/// Largest resume accepted, in bytes (350 KiB).
pub const MAX_RESUME_BYTES: usize = 350 * 1024;
/// Whole-request cap: the resume plus headroom for the text fields.
pub const MAX_REQUEST_BYTES: usize = MAX_RESUME_BYTES + 64 * 1024;

pub const RESUME_FIELD: &str = "resume";
pub const RESUME_TOO_LARGE: &str = "File is too large. Max size is 350KB.";
pub const RESUME_REQUIRED: &str = "Resume file is required";
pub const RESUME_DUPLICATED: &str = "Only one resume file may be uploaded";

/// Parsed multipart body of a create request. Nothing here is validated
/// beyond the resume size; presence checks belong to the store.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub currentyear: Option<String>,
    pub scholar_no: Option<String>,
    pub branch: Option<String>,
    pub pref1: Option<String>,
    pub pref2: Option<String>,
    pub message: Option<String>,
    pub resume: Option<Bytes>,
}

impl SubmissionForm {
    /// Hands the form to the store layer. Fails only when no file was sent.
    pub fn into_submission(self) -> Result<NewSubmission, AppError> {
        let resume = self
            .resume
            .ok_or_else(|| AppError::Validation(RESUME_REQUIRED.to_string()))?;

        Ok(NewSubmission {
            name: self.name,
            email: self.email,
            currentyear: self.currentyear,
            scholar_no: self.scholar_no,
            branch: self.branch,
            pref1: self.pref1,
            pref2: self.pref2,
            resume,
            message: self.message,
        })
    }
}

/// Reads every part of a create request. The resume is streamed and the
/// request is abandoned as soon as it passes [`MAX_RESUME_BYTES`].
pub async fn read_submission_form(multipart: &mut Multipart) -> Result<SubmissionForm, AppError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == RESUME_FIELD && field.file_name().is_some() {
            if form.resume.is_some() {
                return Err(AppError::Validation(RESUME_DUPLICATED.to_string()));
            }
            form.resume = Some(read_resume(field).await?);
            continue;
        }

        let slot = match name.as_str() {
            "name" => &mut form.name,
            "email" => &mut form.email,
            "currentyear" => &mut form.currentyear,
            "scholarNo" => &mut form.scholar_no,
            "branch" => &mut form.branch,
            "pref1" => &mut form.pref1,
            "pref2" => &mut form.pref2,
            "message" => &mut form.message,
            _ => {
                debug!("Ignoring unexpected multipart field '{name}'");
                field.bytes().await.map_err(multipart_error)?;
                continue;
            }
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok(form)
}

async fn read_resume(mut field: Field<'_>) -> Result<Bytes, AppError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_RESUME_BYTES {
            return Err(AppError::Validation(RESUME_TOO_LARGE.to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}

/// Multipart failures are client errors. Hitting the body limit is reported
/// with the same message as an oversized resume.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation(RESUME_TOO_LARGE.to_string())
    } else {
        AppError::Validation(format!("Malformed multipart request: {}", err.body_text()))
    }
}
