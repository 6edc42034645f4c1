use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::{ApplicationStore, DirectoryStore};
use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::application_status::ApplicationStatus;
use crate::models::job_posting::JobPosting;

#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl ApplicationService {
    pub fn new(applications: Arc<dyn ApplicationStore>, directory: Arc<dyn DirectoryStore>) -> Self {
        Self {
            applications,
            directory,
        }
    }

    pub async fn job(&self, job_id: Uuid) -> Result<JobPosting> {
        self.directory
            .job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job posting {} not found", job_id)))
    }

    pub async fn apply(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Application> {
        self.directory
            .candidate(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", candidate_id)))?;
        self.job(job_id).await?;

        if self
            .applications
            .find_active(candidate_id, job_id)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "Candidate already has an active application for this job".into(),
            ));
        }

        let application = Application::new(candidate_id, job_id, Utc::now());
        self.applications.insert(&application).await?;
        tracing::info!(
            application_id = %application.id,
            candidate_id = %candidate_id,
            job_id = %job_id,
            "application submitted"
        );
        Ok(application)
    }

    /// Candidate-initiated soft removal, allowed only before a decision.
    pub async fn withdraw(&self, application_id: Uuid, candidate_id: Uuid) -> Result<()> {
        let application = self
            .applications
            .get(application_id)
            .await?
            .filter(|app| app.candidate_id == candidate_id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))?;

        if !application.status.can_withdraw() {
            return Err(Error::Validation(format!(
                "Applications in status '{}' can no longer be withdrawn",
                application.status.label()
            )));
        }

        if !self
            .applications
            .mark_withdrawn(application_id, application.status, Utc::now())
            .await?
        {
            return Err(Error::Conflict(format!(
                "Application {} was modified concurrently",
                application_id
            )));
        }
        tracing::info!(application_id = %application_id, "application withdrawn");
        Ok(())
    }

    pub async fn get(&self, application_id: Uuid) -> Result<Application> {
        self.applications
            .get(application_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))
    }

    pub async fn list_for_job(
        &self,
        job_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        self.applications.list_by_job(job_id, status).await
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        self.applications.list_by_candidate(candidate_id).await
    }

    /// Active applications per status; every status is present, zero or not.
    pub async fn status_counts(&self, job_id: Uuid) -> Result<BTreeMap<ApplicationStatus, i64>> {
        let mut counts: BTreeMap<ApplicationStatus, i64> =
            ApplicationStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for application in self.applications.list_by_job(job_id, None).await? {
            *counts.entry(application.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
