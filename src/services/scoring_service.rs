use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::database::{ApplicationStore, DirectoryStore};
use crate::error::{Error, Result};
use crate::models::application::{Application, AtsScore, Recommendation};
use crate::models::application_status::ApplicationStatus;
use crate::models::batch::{BatchSummary, ItemFailure};
use crate::models::candidate::CandidateProfile;
use crate::models::job_posting::JobPosting;
use crate::services::transition_service::TransitionEngine;

/// External fit-scoring collaborator.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, candidate: &CandidateProfile, job: &JobPosting) -> Result<AtsScore>;
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringSettings {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_secs(45),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredApplication {
    pub application_id: Uuid,
    pub score: u8,
    pub recommendation: Recommendation,
    pub auto_shortlisted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecalculationSummary {
    pub job_id: Uuid,
    pub considered: usize,
    #[serde(flatten)]
    pub results: BatchSummary<ScoredApplication>,
}

#[derive(Clone)]
pub struct ScoringTrigger {
    applications: Arc<dyn ApplicationStore>,
    directory: Arc<dyn DirectoryStore>,
    scorer: Arc<dyn Scorer>,
    engine: TransitionEngine,
    settings: ScoringSettings,
}

fn validate_threshold(threshold: Option<i32>) -> Result<Option<u8>> {
    match threshold {
        None => Ok(None),
        Some(t) if (0..=100).contains(&t) => Ok(Some(t as u8)),
        Some(t) => Err(Error::Validation(format!(
            "auto_shortlist_threshold must be between 0 and 100, got {}",
            t
        ))),
    }
}

impl ScoringTrigger {
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        directory: Arc<dyn DirectoryStore>,
        scorer: Arc<dyn Scorer>,
        engine: TransitionEngine,
        settings: ScoringSettings,
    ) -> Self {
        Self {
            applications,
            directory,
            scorer,
            engine,
            settings,
        }
    }

    /// Scores every `applied` application under `job_id`, optionally
    /// shortlisting those at or above the threshold.
    ///
    /// Per-candidate failures are collected in the summary; only request-level
    /// problems (bad threshold, unknown job, store failure while listing) fail
    /// the whole call.
    pub async fn recalculate_scores(
        &self,
        job_id: Uuid,
        auto_shortlist_threshold: Option<i32>,
    ) -> Result<RecalculationSummary> {
        let threshold = validate_threshold(auto_shortlist_threshold)?;
        let job = self
            .directory
            .job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job posting {} not found", job_id)))?;
        let pending = self
            .applications
            .list_by_job(job_id, Some(ApplicationStatus::Applied))
            .await?;

        tracing::info!(
            job_id = %job_id,
            candidates = pending.len(),
            threshold = ?threshold,
            "recalculating ATS scores"
        );

        let order: HashMap<Uuid, usize> = pending
            .iter()
            .enumerate()
            .map(|(idx, app)| (app.id, idx))
            .collect();
        let job = Arc::new(job);
        let permits = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for application in pending {
            let this = self.clone();
            let job = Arc::clone(&job);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let id = application.id;
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => this.score_one(application, &job, threshold).await,
                    Err(_) => Err(Error::Internal("scoring semaphore closed".into())),
                };
                (id, outcome)
            });
        }

        let mut results = BatchSummary::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(scored))) => results.succeeded.push(scored),
                Ok((id, Err(err))) => {
                    tracing::warn!(application_id = %id, error = %err, "ATS scoring item failed");
                    results.failed.push(ItemFailure::from_error(id, &err));
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "ATS scoring task aborted");
                }
            }
        }

        // A task that panicked never reported back; surface it by id.
        for &id in order.keys() {
            let reported = results.succeeded.iter().any(|s| s.application_id == id)
                || results.failure_for(id).is_some();
            if !reported {
                let err = Error::Internal("scoring task aborted".into());
                results.failed.push(ItemFailure::from_error(id, &err));
            }
        }

        results
            .succeeded
            .sort_by_key(|s| order.get(&s.application_id).copied());
        results
            .failed
            .sort_by_key(|f| order.get(&f.application_id).copied());

        tracing::info!(
            job_id = %job_id,
            succeeded = results.succeeded.len(),
            failed = results.failed.len(),
            "ATS recalculation finished"
        );

        Ok(RecalculationSummary {
            job_id,
            considered: order.len(),
            results,
        })
    }

    async fn score_one(
        &self,
        application: Application,
        job: &JobPosting,
        threshold: Option<u8>,
    ) -> Result<ScoredApplication> {
        let candidate = self
            .directory
            .candidate(application.candidate_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Candidate profile {} not found",
                    application.candidate_id
                ))
            })?;

        let mut score =
            match tokio::time::timeout(self.settings.timeout, self.scorer.score(&candidate, job))
                .await
            {
                Ok(Ok(score)) => score,
                Ok(Err(Error::Upstream(msg))) => return Err(Error::Upstream(msg)),
                Ok(Err(other)) => return Err(Error::Upstream(other.to_string())),
                Err(_) => {
                    return Err(Error::Upstream(format!(
                        "Scoring timed out after {}s",
                        self.settings.timeout.as_secs()
                    )))
                }
            };
        score.score = score.score.min(100);

        // The recruiter may have decided on the application while it was scored.
        if !self
            .applications
            .save_ats_score(
                application.id,
                ApplicationStatus::Applied,
                &score,
                Utc::now(),
            )
            .await?
        {
            return Err(Error::Conflict(format!(
                "Application {} left the applied status before its score was stored",
                application.id
            )));
        }

        let auto_shortlisted = match threshold {
            Some(min) if score.score >= min => {
                self.engine
                    .apply_single_transition(
                        application.id,
                        ApplicationStatus::Shortlisted,
                        None,
                        None,
                    )
                    .await?;
                true
            }
            _ => false,
        };

        Ok(ScoredApplication {
            application_id: application.id,
            score: score.score,
            recommendation: score.recommendation,
            auto_shortlisted,
        })
    }
}
