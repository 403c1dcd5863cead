use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Submission metadata as exposed over HTTP. The resume blob is never part
/// of this row; it is fetched separately as a [`ResumeFile`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
}

/// Raw form input handed to the store. Text fields stay optional here: the
/// store's schema check decides what is missing.
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub currentyear: Option<String>,
    pub scholar_no: Option<String>,
    pub branch: Option<String>,
    pub pref1: Option<String>,
    pub pref2: Option<String>,
    pub resume: Bytes,
    pub message: Option<String>,
}

/// A submission that passed schema validation and is ready to persist.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub name: String,
    pub email: String,
    pub currentyear: String,
    pub scholar_no: String,
    pub branch: String,
    pub pref1: String,
    pub pref2: String,
    pub resume: Bytes,
    pub message: Option<String>,
}

impl ValidSubmission {
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> (Submission, Bytes) {
        let submission = Submission {
            id,
            name: self.name,
            email: self.email,
            currentyear: self.currentyear,
            scholar_no: self.scholar_no,
            branch: self.branch,
            pref1: self.pref1,
            pref2: self.pref2,
            message: self.message,
            created_at,
        };
        (submission, self.resume)
    }
}

/// A stored resume together with the applicant name used for its filename.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl ResumeFile {
    pub fn file_name(&self) -> String {
        format!("{}_resume.pdf", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_uses_form_field_names() {
        let (submission, _) = ValidSubmission {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            currentyear: "2".into(),
            scholar_no: "21112233".into(),
            branch: "CSE".into(),
            pref1: "Treasurer".into(),
            pref2: "Executive".into(),
            resume: Bytes::from_static(b"%PDF"),
            message: None,
        }
        .into_record(Uuid::new_v4(), Utc::now());

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["scholarNo"], "21112233");
        assert_eq!(value["currentyear"], "2");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("scholar_no").is_none());
        assert!(value.get("resume").is_none());
    }

    #[test]
    fn test_resume_file_name() {
        let resume = ResumeFile {
            name: "Asha Rao".into(),
            data: vec![1, 2, 3],
        };
        assert_eq!(resume.file_name(), "Asha Rao_resume.pdf");
    }
}
