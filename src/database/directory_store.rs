use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::CandidateProfile;
use crate::models::job_posting::JobPosting;

/// Read-only access to the profile and job-posting records other parts of
/// the portal maintain.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn candidate(&self, id: Uuid) -> Result<Option<CandidateProfile>>;
    async fn job(&self, id: Uuid) -> Result<Option<JobPosting>>;
}

#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn candidate(&self, id: Uuid) -> Result<Option<CandidateProfile>> {
        let candidate = sqlx::query_as::<_, CandidateProfile>(
            r#"
            SELECT id, name, email, department, graduation_year, cgpa, skills, resume_text
            FROM candidates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    async fn job(&self, id: Uuid) -> Result<Option<JobPosting>> {
        let job = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT id, recruiter_id, title, company, description, requirements,
                   required_skills, min_cgpa, created_at
            FROM job_postings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }
}
