use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::form::FormData;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// The request never got an answer.
    #[error("A network error occurred: {0}. Check your connection or server.")]
    Network(#[source] reqwest::Error),

    #[error("Could not read resume {}: {source}", .path.display())]
    Resume {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected response from server: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
pub struct Created {
    pub message: String,
    pub id: String,
}

/// Submission metadata as returned by the list and detail endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub currentyear: String,
    #[serde(rename = "scholarNo")]
    pub scholar_no: String,
    pub branch: String,
    pub pref1: String,
    pub pref2: String,
    pub message: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct DownloadedResume {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Thin async client for the intake service.
#[derive(Clone)]
pub struct IntakeClient {
    http: Client,
    base_url: String,
}

impl IntakeClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends every field plus the resume as a single multipart POST.
    pub async fn submit(&self, data: &FormData) -> Result<Created, ClientError> {
        let resume_path = data.resume.as_deref().unwrap_or_else(|| Path::new(""));
        let resume = tokio::fs::read(resume_path)
            .await
            .map_err(|source| ClientError::Resume {
                path: resume_path.to_path_buf(),
                source,
            })?;
        let file_name = resume_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();

        let mut form = Form::new();
        for (name, value) in data.text_fields() {
            form = form.text(name, value);
        }
        let part = Part::bytes(resume)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(ClientError::Decode)?;
        form = form.part("resume", part);

        debug!("Submitting form for {}", data.email);
        let response = self
            .http
            .post(self.url("/submissions"))
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Network)?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn list(&self) -> Result<Vec<SubmissionSummary>, ClientError> {
        let response = self
            .http
            .get(self.url("/submissions"))
            .send()
            .await
            .map_err(ClientError::Network)?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn get(&self, id: &str) -> Result<SubmissionSummary, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/submissions/{id}")))
            .send()
            .await
            .map_err(ClientError::Network)?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn download_resume(&self, id: &str) -> Result<DownloadedResume, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/submissions/{id}/resume")))
            .send()
            .await
            .map_err(ClientError::Network)?;
        let response = ensure_success(response).await?;

        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .and_then(|name| local_file_name(&name))
            .unwrap_or_else(|| format!("{id}_resume.pdf"));
        let data = response.bytes().await.map_err(ClientError::Decode)?;
        Ok(DownloadedResume { file_name, data })
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(ClientError::Rejected {
        status,
        message: rejection_message(status, &body),
    })
}

/// Picks the message to show for a rejected request: the JSON `error`
/// field, else a plain-text body, else the bare status.
pub fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            return error;
        }
    } else if let Ok(text) = std::str::from_utf8(body) {
        let text = text.trim();
        if !text.is_empty() && !text.starts_with('{') {
            return text.to_string();
        }
    }
    format!("Server responded with status {}", status.as_u16())
}

/// Extracts `filename` from an `attachment; filename="..."` header value.
/// A quoted value is taken whole, so `;` inside it is kept.
pub fn attachment_filename(disposition: &str) -> Option<String> {
    const KEY: &str = "filename=";
    let start = disposition.find(KEY)? + KEY.len();
    let rest = &disposition[start..];
    let name = match rest.strip_prefix('"') {
        Some(quoted) => &quoted[..quoted.find('"')?],
        None => rest.split(';').next().unwrap_or("").trim(),
    };
    Some(name.to_string()).filter(|name| !name.is_empty())
}

/// Reduces a server-supplied name to a single path component so a download
/// can only land in the working directory.
pub fn local_file_name(suggested: &str) -> Option<String> {
    let last = suggested.rsplit(&['/', '\\'][..]).next()?;
    Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .map(str::to_string)
}
