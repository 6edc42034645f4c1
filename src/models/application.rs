use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::application_status::ApplicationStatus;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    StrongMatch,
    GoodMatch,
    PartialMatch,
    WeakMatch,
}

impl Recommendation {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Recommendation::StrongMatch,
            60..=79 => Recommendation::GoodMatch,
            40..=59 => Recommendation::PartialMatch,
            _ => Recommendation::WeakMatch,
        }
    }

    pub(crate) fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "strong-match" | "strong" => Some(Recommendation::StrongMatch),
            "good-match" | "good" => Some(Recommendation::GoodMatch),
            "partial-match" | "partial" => Some(Recommendation::PartialMatch),
            "weak-match" | "weak" => Some(Recommendation::WeakMatch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsScore {
    pub score: u8,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub shortlisted_at: Option<DateTime<Utc>>,
    pub selected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub recruiter_notes: Option<String>,
    pub ats_score: Option<AtsScore>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn new(candidate_id: Uuid, job_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            job_id,
            status: ApplicationStatus::Applied,
            applied_at: now,
            shortlisted_at: None,
            selected_at: None,
            rejection_reason: None,
            recruiter_notes: None,
            ats_score: None,
            updated_at: now,
            withdrawn_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.withdrawn_at.is_none()
    }
}

/// Storage shape of an application row; status is kept as text.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub shortlisted_at: Option<DateTime<Utc>>,
    pub selected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub recruiter_notes: Option<String>,
    pub ats_score: Option<Json<AtsScore>>,
    pub updated_at: DateTime<Utc>,
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            Error::Internal(format!(
                "Application {} has unknown stored status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(Self {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            status,
            applied_at: row.applied_at,
            shortlisted_at: row.shortlisted_at,
            selected_at: row.selected_at,
            rejection_reason: row.rejection_reason,
            recruiter_notes: row.recruiter_notes,
            ats_score: row.ats_score.map(|json| json.0),
            updated_at: row.updated_at,
            withdrawn_at: row.withdrawn_at,
        })
    }
}
