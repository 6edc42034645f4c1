use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationRow, AtsScore};
use crate::models::application_status::ApplicationStatus;

/// Persistence seam for application records.
///
/// Every read ignores withdrawn records. Writes touch a single record and are
/// the unit of atomicity; nothing here spans records.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Application>>;

    async fn list_by_job(
        &self,
        job_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>>;

    async fn list_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>>;

    async fn find_active(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Option<Application>>;

    /// Fails with `Conflict` when the pair already has an active application.
    async fn insert(&self, application: &Application) -> Result<()>;

    /// Persists the lifecycle fields of `application` only if the stored
    /// status is still `expected`. Returns `false` when the guard did not hold.
    async fn update_status(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool>;

    /// Overwrites the stored ATS score only if the stored status is still
    /// `expected`. Status is never touched. Returns `false` when the guard did
    /// not hold.
    async fn save_ats_score(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        score: &AtsScore,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn mark_withdrawn(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool>;
}

const APPLICATION_COLUMNS: &str = "id, candidate_id, job_id, status, applied_at, shortlisted_at, \
     selected_at, rejection_reason, recruiter_notes, ats_score, updated_at, withdrawn_at";

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_applications(rows: Vec<ApplicationRow>) -> Result<Vec<Application>> {
    rows.into_iter().map(Application::try_from).collect()
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 AND withdrawn_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list_by_job(
        &self,
        job_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS} FROM applications
            WHERE job_id = $1
              AND withdrawn_at IS NULL
              AND ($2::text IS NULL OR status = $2)
            ORDER BY applied_at DESC
            "#
        ))
        .bind(job_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        into_applications(rows)
    }

    async fn list_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS} FROM applications
            WHERE candidate_id = $1 AND withdrawn_at IS NULL
            ORDER BY applied_at DESC
            "#
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        into_applications(rows)
    }

    async fn find_active(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS} FROM applications
            WHERE candidate_id = $1 AND job_id = $2 AND withdrawn_at IS NULL
            "#
        ))
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn insert(&self, application: &Application) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO applications (id, candidate_id, job_id, status, applied_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(application.id)
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(application.status.as_str())
        .bind(application.applied_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                Error::Conflict("Candidate already has an active application for this job".into()),
            ),
            Err(other) => Err(other.into()),
        }
    }

    async fn update_status(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2,
                shortlisted_at = COALESCE(shortlisted_at, $3),
                selected_at = COALESCE(selected_at, $4),
                rejection_reason = $5,
                recruiter_notes = $6,
                updated_at = $7
            WHERE id = $1 AND status = $8 AND withdrawn_at IS NULL
            "#,
        )
        .bind(application.id)
        .bind(application.status.as_str())
        .bind(application.shortlisted_at)
        .bind(application.selected_at)
        .bind(application.rejection_reason.as_deref())
        .bind(application.recruiter_notes.as_deref())
        .bind(application.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn save_ats_score(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        score: &AtsScore,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET ats_score = $2, updated_at = $3
            WHERE id = $1 AND status = $4 AND withdrawn_at IS NULL
            "#,
        )
        .bind(id)
        .bind(Json(score))
        .bind(at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_withdrawn(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET withdrawn_at = $2, updated_at = $2
            WHERE id = $1 AND status = $3 AND withdrawn_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
