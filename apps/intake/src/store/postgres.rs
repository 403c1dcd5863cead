use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{parse_id, validate, StoreError, SubmissionStore};
use crate::models::submission::{NewSubmission, ResumeFile, Submission};

const SUBMISSION_COLUMNS: &str =
    "id, name, email, currentyear, scholar_no, branch, pref1, pref2, message, created_at";

/// Listing follows the `seq` sequence, which is assigned in insert order.
/// `created_at` comes from `now()` and ties within a transaction.
fn list_sql() -> String {
    format!("SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY seq")
}

/// PostgreSQL-backed store. `UNIQUE` constraints on `email` and `scholar_no`
/// are the only conflict check.
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-constraint violation to [`StoreError::Conflict`]; every
/// other database failure passes through untouched.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some("submissions_email_key") => "email",
                Some("submissions_scholar_no_key") => "scholarNo",
                Some(other) => other,
                None => "unknown",
            };
            return StoreError::Conflict(field.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn insert(&self, submission: NewSubmission) -> Result<Uuid, StoreError> {
        let submission = validate(submission)?;
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO submissions
                (id, name, email, currentyear, scholar_no, branch, pref1, pref2, resume, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.currentyear)
        .bind(&submission.scholar_no)
        .bind(&submission.branch)
        .bind(&submission.pref1)
        .bind(&submission.pref2)
        .bind(submission.resume.as_ref())
        .bind(&submission.message)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        info!(
            "Inserted submission {id} ({} bytes resume)",
            submission.resume.len()
        );
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let rows = sqlx::query_as::<_, Submission>(&list_sql())
            .fetch_all(&self.pool)
            .await?;
        debug!("Listed {} submissions", rows.len());
        Ok(rows)
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        let id = parse_id(id)?;
        let row = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn resume(&self, id: &str) -> Result<Option<ResumeFile>, StoreError> {
        let id = parse_id(id)?;
        let row: Option<ResumeFile> = sqlx::query_as(
            "SELECT name, resume AS data FROM submissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.filter(|r| !r.data.is_empty()))
    }
}
