use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub company: String,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub required_skills: Vec<String>,
    pub min_cgpa: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
