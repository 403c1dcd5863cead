pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::submission::{NewSubmission, ResumeFile, Submission, ValidSubmission};

pub use memory::MemorySubmissionStore;
pub use postgres::PgSubmissionStore;

/// Failure kinds reported by a [`SubmissionStore`]. Handlers map these to
/// HTTP statuses without knowing how a backend encodes them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Submission validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Duplicate value for unique field {0}")]
    Conflict(String),

    #[error("Cast to UUID failed for value \"{0}\"")]
    InvalidId(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for submissions.
///
/// Implementations own field-presence validation and the uniqueness of
/// `email` and `scholarNo`; callers never pre-check either.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Validates and inserts one submission atomically, returning its new id.
    async fn insert(&self, submission: NewSubmission) -> Result<Uuid, StoreError>;

    /// All submissions in creation order, without resumes.
    async fn list(&self) -> Result<Vec<Submission>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Submission>, StoreError>;

    async fn resume(&self, id: &str) -> Result<Option<ResumeFile>, StoreError>;
}

/// Schema check shared by every backend. A required path fails when it is
/// absent or empty; whitespace-only values are accepted as given.
pub fn validate(submission: NewSubmission) -> Result<ValidSubmission, StoreError> {
    let NewSubmission {
        name,
        email,
        currentyear,
        scholar_no,
        branch,
        pref1,
        pref2,
        resume,
        message,
    } = submission;

    let mut missing = Vec::new();
    let mut require = |path: &str, value: Option<String>| -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                missing.push(format!("{path}: Path `{path}` is required."));
                String::new()
            }
        }
    };

    let name = require("name", name);
    let email = require("email", email);
    let currentyear = require("currentyear", currentyear);
    let scholar_no = require("scholarNo", scholar_no);
    let branch = require("branch", branch);
    let pref1 = require("pref1", pref1);
    let pref2 = require("pref2", pref2);
    if resume.is_empty() {
        missing.push("resume: Path `resume` is required.".to_string());
    }

    if !missing.is_empty() {
        return Err(StoreError::Validation(missing));
    }

    Ok(ValidSubmission {
        name,
        email,
        currentyear,
        scholar_no,
        branch,
        pref1,
        pref2,
        resume,
        message: message.filter(|m| !m.is_empty()),
    })
}

pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
