use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{parse_id, validate, StoreError, SubmissionStore};
use crate::models::submission::{NewSubmission, ResumeFile, Submission};

struct StoredSubmission {
    meta: Submission,
    resume: Bytes,
}

/// In-process store for local runs without a database and for tests.
/// Uniqueness checks and the insert happen under one write lock.
#[derive(Default)]
pub struct MemorySubmissionStore {
    records: RwLock<Vec<StoredSubmission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn insert(&self, submission: NewSubmission) -> Result<Uuid, StoreError> {
        let submission = validate(submission)?;

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.meta.email == submission.email) {
            return Err(StoreError::Conflict("email".to_string()));
        }
        if records.iter().any(|r| r.meta.scholar_no == submission.scholar_no) {
            return Err(StoreError::Conflict("scholarNo".to_string()));
        }

        let id = Uuid::new_v4();
        let (meta, resume) = submission.into_record(id, Utc::now());
        records.push(StoredSubmission { meta, resume });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().map(|r| r.meta.clone()).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        let id = parse_id(id)?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.meta.id == id)
            .map(|r| r.meta.clone()))
    }

    async fn resume(&self, id: &str) -> Result<Option<ResumeFile>, StoreError> {
        let id = parse_id(id)?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.meta.id == id && !r.resume.is_empty())
            .map(|r| ResumeFile {
                name: r.meta.name.clone(),
                data: r.resume.to_vec(),
            }))
    }
}
