//! Process-local store backing the test suite.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::application_store::ApplicationStore;
use super::directory_store::DirectoryStore;
use super::notification_store::NotificationStore;
use crate::error::{Error, Result};
use crate::models::application::{Application, AtsScore};
use crate::models::application_status::ApplicationStatus;
use crate::models::candidate::CandidateProfile;
use crate::models::job_posting::JobPosting;
use crate::models::notification::{CreateNotification, Notification};

#[derive(Default)]
pub struct InMemoryStore {
    applications: RwLock<HashMap<Uuid, Application>>,
    candidates: RwLock<HashMap<Uuid, CandidateProfile>>,
    jobs: RwLock<HashMap<Uuid, JobPosting>>,
    notifications: RwLock<Vec<Notification>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| Error::Internal("in-memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| Error::Internal("in-memory store lock poisoned".into()))
}

fn newest_first(mut items: Vec<Application>) -> Vec<Application> {
    items.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
    items
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_candidate(&self, candidate: CandidateProfile) -> Result<()> {
        write(&self.candidates)?.insert(candidate.id, candidate);
        Ok(())
    }

    pub fn add_job(&self, job: JobPosting) -> Result<()> {
        write(&self.jobs)?.insert(job.id, job);
        Ok(())
    }

    /// Stores a record as-is, bypassing the pair-uniqueness check. Intended
    /// for seeding fixtures in a given state.
    pub fn put_application(&self, application: Application) -> Result<()> {
        write(&self.applications)?.insert(application.id, application);
        Ok(())
    }

    /// Raw lookup that also returns withdrawn records.
    pub fn snapshot(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(read(&self.applications)?.get(&id).cloned())
    }

    pub fn notifications(&self) -> Result<Vec<Notification>> {
        Ok(read(&self.notifications)?.clone())
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(read(&self.applications)?
            .get(&id)
            .filter(|app| app.is_active())
            .cloned())
    }

    async fn list_by_job(
        &self,
        job_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        let items = read(&self.applications)?
            .values()
            .filter(|app| app.is_active() && app.job_id == job_id)
            .filter(|app| status.map_or(true, |s| app.status == s))
            .cloned()
            .collect();
        Ok(newest_first(items))
    }

    async fn list_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let items = read(&self.applications)?
            .values()
            .filter(|app| app.is_active() && app.candidate_id == candidate_id)
            .cloned()
            .collect();
        Ok(newest_first(items))
    }

    async fn find_active(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Option<Application>> {
        Ok(read(&self.applications)?
            .values()
            .find(|app| app.is_active() && app.candidate_id == candidate_id && app.job_id == job_id)
            .cloned())
    }

    async fn insert(&self, application: &Application) -> Result<()> {
        let mut guard = write(&self.applications)?;
        let duplicate = guard.values().any(|app| {
            app.is_active()
                && app.candidate_id == application.candidate_id
                && app.job_id == application.job_id
        });
        if duplicate {
            return Err(Error::Conflict(
                "Candidate already has an active application for this job".into(),
            ));
        }
        guard.insert(application.id, application.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool> {
        let mut guard = write(&self.applications)?;
        let Some(stored) = guard.get_mut(&application.id) else {
            return Ok(false);
        };
        if !stored.is_active() || stored.status != expected {
            return Ok(false);
        }
        stored.status = application.status;
        stored.shortlisted_at = stored.shortlisted_at.or(application.shortlisted_at);
        stored.selected_at = stored.selected_at.or(application.selected_at);
        stored.rejection_reason = application.rejection_reason.clone();
        stored.recruiter_notes = application.recruiter_notes.clone();
        stored.updated_at = application.updated_at;
        Ok(true)
    }

    async fn save_ats_score(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        score: &AtsScore,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut guard = write(&self.applications)?;
        match guard.get_mut(&id) {
            Some(stored) if stored.is_active() && stored.status == expected => {
                stored.ats_score = Some(score.clone());
                stored.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_withdrawn(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut guard = write(&self.applications)?;
        match guard.get_mut(&id) {
            Some(stored) if stored.is_active() && stored.status == expected => {
                stored.withdrawn_at = Some(at);
                stored.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn candidate(&self, id: Uuid) -> Result<Option<CandidateProfile>> {
        Ok(read(&self.candidates)?.get(&id).cloned())
    }

    async fn job(&self, id: Uuid) -> Result<Option<JobPosting>> {
        Ok(read(&self.jobs)?.get(&id).cloned())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert(&self, notification: CreateNotification) -> Result<Notification> {
        let record = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            application_id: notification.application_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            read_at: None,
            created_at: Utc::now(),
        };
        write(&self.notifications)?.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        let mut items: Vec<Notification> = read(&self.notifications)?
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || n.read_at.is_none()))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn mark_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let mut guard = write(&self.notifications)?;
        let Some(record) = guard
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        else {
            return Ok(None);
        };
        record.read_at = record.read_at.or(Some(at));
        Ok(Some(record.clone()))
    }
}
