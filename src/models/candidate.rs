use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Student profile as read by the scoring trigger. Profile editing lives
/// outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub graduation_year: Option<i32>,
    pub cgpa: Option<Decimal>,
    pub skills: Vec<String>,
    pub resume_text: Option<String>,
}
