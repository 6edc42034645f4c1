use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::models::application::Application;
use crate::models::application_status::ApplicationStatus;
use crate::models::batch::BatchSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPayload {
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(length(max = 2000))]
    pub rejection_reason: Option<String>,
    #[validate(length(max = 4000))]
    pub recruiter_notes: Option<String>,
}

impl UpdateStatusPayload {
    pub fn target(&self) -> Result<ApplicationStatus> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkStatusPayload {
    #[validate(length(min = 1, max = 500))]
    pub application_ids: Vec<Uuid>,
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(length(max = 2000))]
    pub rejection_reason: Option<String>,
}

impl BulkStatusPayload {
    pub fn target(&self) -> Result<ApplicationStatus> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkStatusResponse {
    pub requested: usize,
    #[serde(flatten)]
    pub summary: BatchSummary<Application>,
}

impl BulkStatusResponse {
    pub fn new(requested: usize, summary: BatchSummary<Application>) -> Self {
        Self { requested, summary }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
}

impl ApplicationListQuery {
    pub fn status_filter(&self) -> Result<Option<ApplicationStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecalculatePayload {
    pub auto_shortlist_threshold: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountsResponse {
    pub job_id: Uuid,
    pub counts: BTreeMap<ApplicationStatus, i64>,
    pub total: i64,
}

impl StatusCountsResponse {
    pub fn new(job_id: Uuid, counts: BTreeMap<ApplicationStatus, i64>) -> Self {
        let total = counts.values().sum();
        Self {
            job_id,
            counts,
            total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDictionaryEntry {
    pub value: ApplicationStatus,
    pub label: &'static str,
    pub terminal: bool,
    pub can_withdraw: bool,
    pub next: Vec<ApplicationStatus>,
}

impl From<ApplicationStatus> for StatusDictionaryEntry {
    fn from(status: ApplicationStatus) -> Self {
        Self {
            value: status,
            label: status.label(),
            terminal: status.is_terminal(),
            can_withdraw: status.can_withdraw(),
            next: status.successors(),
        }
    }
}
