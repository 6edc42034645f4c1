use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::ApplicationStore;
use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::application_status::ApplicationStatus;
use crate::models::batch::{BatchSummary, ItemFailure};
use crate::models::transition_event::TransitionEvent;
use crate::services::notification_service::NotificationSink;

pub const MAX_BULK_IDS: usize = 500;
const NOTIFY_ATTEMPTS: u32 = 3;
const NOTIFY_BACKOFF: Duration = Duration::from_millis(100);

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn require_reason(target: ApplicationStatus, reason: Option<&str>) -> Result<Option<String>> {
    let reason = non_empty(reason);
    if target == ApplicationStatus::Rejected && reason.is_none() {
        return Err(Error::Validation(
            "rejection_reason is required when rejecting an application".into(),
        ));
    }
    Ok(reason)
}

/// Computes the record that results from moving `current` to `target`.
///
/// Pure: nothing is persisted. First-reached timestamps are only filled when
/// still empty.
pub fn plan_transition(
    current: &Application,
    target: ApplicationStatus,
    reason: Option<&str>,
    notes: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Application> {
    let reason = require_reason(target, reason)?;
    if !current.status.can_transition_to(target) {
        return Err(Error::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    let mut next = current.clone();
    next.status = target;
    next.updated_at = at;
    match target {
        ApplicationStatus::Shortlisted => {
            next.shortlisted_at = current.shortlisted_at.or(Some(at));
        }
        ApplicationStatus::Selected => {
            next.selected_at = current.selected_at.or(Some(at));
        }
        ApplicationStatus::Rejected => {
            next.rejection_reason = reason;
        }
        ApplicationStatus::Applied | ApplicationStatus::OnHold => {}
    }
    if let Some(notes) = non_empty(notes) {
        next.recruiter_notes = Some(notes);
    }
    Ok(next)
}

#[derive(Clone)]
pub struct TransitionEngine {
    store: Arc<dyn ApplicationStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl TransitionEngine {
    pub fn new(store: Arc<dyn ApplicationStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    pub async fn apply_single_transition(
        &self,
        application_id: Uuid,
        target: ApplicationStatus,
        reason: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Application> {
        self.transition(application_id, None, target, reason, notes)
            .await
    }

    pub async fn apply_bulk_transition(
        &self,
        application_ids: &[Uuid],
        target: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<BatchSummary<Application>> {
        self.bulk(None, application_ids, target, reason).await
    }

    pub async fn apply_bulk_transition_in_job(
        &self,
        job_id: Uuid,
        application_ids: &[Uuid],
        target: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<BatchSummary<Application>> {
        self.bulk(Some(job_id), application_ids, target, reason)
            .await
    }

    async fn bulk(
        &self,
        job_id: Option<Uuid>,
        application_ids: &[Uuid],
        target: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<BatchSummary<Application>> {
        if application_ids.is_empty() {
            return Err(Error::Validation("application_ids must not be empty".into()));
        }
        if application_ids.len() > MAX_BULK_IDS {
            return Err(Error::Validation(format!(
                "at most {} applications can be updated at once",
                MAX_BULK_IDS
            )));
        }
        require_reason(target, reason)?;

        let mut summary = BatchSummary::new();
        for &id in application_ids {
            match self.transition(id, job_id, target, reason, None).await {
                Ok(application) => summary.succeeded.push(application),
                Err(err) => {
                    tracing::warn!(application_id = %id, error = %err, "bulk transition item failed");
                    summary.failed.push(ItemFailure::from_error(id, &err));
                }
            }
        }

        tracing::info!(
            target_status = %target,
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "bulk transition finished"
        );
        Ok(summary)
    }

    async fn transition(
        &self,
        application_id: Uuid,
        job_id: Option<Uuid>,
        target: ApplicationStatus,
        reason: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Application> {
        require_reason(target, reason)?;

        let current = self
            .store
            .get(application_id)
            .await?
            .filter(|app| job_id.map_or(true, |job| app.job_id == job))
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))?;

        let next = plan_transition(&current, target, reason, notes, Utc::now())?;

        if !self.store.update_status(&next, current.status).await? {
            return Err(Error::Conflict(format!(
                "Application {} was modified concurrently",
                application_id
            )));
        }

        tracing::info!(
            application_id = %application_id,
            from = %current.status,
            to = %target,
            "application status changed"
        );

        self.emit(TransitionEvent {
            application_id,
            candidate_id: next.candidate_id,
            job_id: next.job_id,
            from_status: current.status,
            to_status: target,
            occurred_at: next.updated_at,
        })
        .await;

        Ok(next)
    }

    /// Delivery happens after commit and never fails the transition.
    async fn emit(&self, event: TransitionEvent) {
        let mut delay = NOTIFY_BACKOFF;
        for attempt in 1..=NOTIFY_ATTEMPTS {
            match self.notifier.dispatch(&event).await {
                Ok(()) => return,
                Err(err) if attempt < NOTIFY_ATTEMPTS => {
                    tracing::warn!(
                        application_id = %event.application_id,
                        attempt,
                        error = %err,
                        "notification dispatch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => {
                    tracing::error!(
                        application_id = %event.application_id,
                        error = %err,
                        "notification dispatch gave up"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn applied() -> Application {
        Application::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now() - ChronoDuration::days(2))
    }

    #[test]
    fn shortlisting_stamps_time_once() {
        let at = Utc::now();
        let next = plan_transition(&applied(), ApplicationStatus::Shortlisted, None, None, at)
            .unwrap();
        assert_eq!(next.status, ApplicationStatus::Shortlisted);
        assert_eq!(next.shortlisted_at, Some(at));

        let mut revisited = next.clone();
        revisited.status = ApplicationStatus::OnHold;
        let later = at + ChronoDuration::hours(1);
        let again =
            plan_transition(&revisited, ApplicationStatus::Shortlisted, None, None, later).unwrap();
        assert_eq!(again.shortlisted_at, Some(at));
    }

    #[test]
    fn rejection_requires_non_blank_reason() {
        let current = applied();
        let err = plan_transition(&current, ApplicationStatus::Rejected, Some("   "), None, Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");

        let next = plan_transition(
            &current,
            ApplicationStatus::Rejected,
            Some(" CGPA below cutoff "),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(next.rejection_reason.as_deref(), Some("CGPA below cutoff"));
    }

    #[test]
    fn validation_precedes_legality() {
        let mut selected = applied();
        selected.status = ApplicationStatus::Selected;
        let err =
            plan_transition(&selected, ApplicationStatus::Rejected, None, None, Utc::now()).unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn illegal_edges_are_rejected() {
        let mut current = applied();
        current.status = ApplicationStatus::Shortlisted;
        let err = plan_transition(&current, ApplicationStatus::Applied, None, None, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ApplicationStatus::Shortlisted,
                to: ApplicationStatus::Applied
            }
        ));
    }

    #[test]
    fn notes_are_kept_unless_replaced() {
        let mut current = applied();
        current.recruiter_notes = Some("strong DSA round".into());
        let next =
            plan_transition(&current, ApplicationStatus::OnHold, None, None, Utc::now()).unwrap();
        assert_eq!(next.recruiter_notes.as_deref(), Some("strong DSA round"));

        let next = plan_transition(
            &current,
            ApplicationStatus::OnHold,
            None,
            Some("waiting on second panel"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(next.recruiter_notes.as_deref(), Some("waiting on second panel"));
    }
}
