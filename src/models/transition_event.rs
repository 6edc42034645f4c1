use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application_status::ApplicationStatus;

/// Emitted once a status change has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub application_id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub from_status: ApplicationStatus,
    pub to_status: ApplicationStatus,
    pub occurred_at: DateTime<Utc>,
}

pub const APPLICATION_STATUS_KIND: &str = "application-status";
