use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::application::{AtsScore, Recommendation};
use crate::models::candidate::CandidateProfile;
use crate::models::job_posting::JobPosting;
use crate::services::scoring_service::Scorer;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_RESUME_CHARS: usize = 12_000;

const SYSTEM_PROMPT: &str = r#"You are an applicant tracking system used by a university placement cell.
Score how well a student's profile fits a job posting.

Rules:
1. Judge only against the stated requirements, required skills and minimum CGPA.
2. A CGPA below the posted minimum caps the score at 40.
3. Missing core skills weigh more than missing nice-to-have skills.
4. Score scale:
   - 0-39: weak match
   - 40-59: partial match
   - 60-79: good match
   - 80-100: strong match
5. List at most five strengths and five weaknesses, each a short phrase.

Return JSON: { "score": <0-100>, "recommendation": "strong-match" | "good-match" | "partial-match" | "weak-match", "strengths": [string], "weaknesses": [string] }"#;

#[derive(Debug, Deserialize)]
struct RawAtsScore {
    score: f64,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
}

impl From<RawAtsScore> for AtsScore {
    fn from(raw: RawAtsScore) -> Self {
        let score = if raw.score.is_finite() {
            raw.score.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        let recommendation = raw
            .recommendation
            .as_deref()
            .and_then(Recommendation::parse_loose)
            .unwrap_or_else(|| Recommendation::from_score(score));
        Self {
            score,
            recommendation,
            strengths: raw.strengths.into_iter().take(5).collect(),
            weaknesses: raw.weaknesses.into_iter().take(5).collect(),
        }
    }
}

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    model: String,
}

impl AIService {
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    pub fn build_user_prompt(candidate: &CandidateProfile, job: &JobPosting) -> String {
        let resume: String = candidate
            .resume_text
            .as_deref()
            .unwrap_or("")
            .chars()
            .take(MAX_RESUME_CHARS)
            .collect();
        let cgpa = candidate
            .cgpa
            .map(|c| c.to_string())
            .unwrap_or_else(|| "not provided".to_string());
        let min_cgpa = job
            .min_cgpa
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());

        format!(
            "Job: {} at {}\nDescription: {}\nRequirements: {}\nRequired skills: {}\nMinimum CGPA: {}\n\n\
             Candidate: {}\nDepartment: {}\nGraduation year: {}\nCGPA: {}\nSkills: {}\n\nResume:\n{}",
            job.title,
            job.company,
            job.description.as_deref().unwrap_or(""),
            job.requirements.as_deref().unwrap_or(""),
            job.required_skills.join(", "),
            min_cgpa,
            candidate.name,
            candidate.department.as_deref().unwrap_or("not provided"),
            candidate
                .graduation_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "not provided".to_string()),
            cgpa,
            candidate.skills.join(", "),
            resume
        )
    }

    pub fn parse_score(content: JsonValue) -> Result<AtsScore> {
        let raw: RawAtsScore = serde_json::from_value(content)
            .map_err(|e| Error::Upstream(format!("Scoring response was malformed: {}", e)))?;
        Ok(raw.into())
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("OpenAI API Error {}: {}", status, text)));
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| Error::Upstream("Invalid OpenAI response format".into()))
    }
}

#[async_trait]
impl Scorer for AIService {
    async fn score(&self, candidate: &CandidateProfile, job: &JobPosting) -> Result<AtsScore> {
        let payload = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": Self::build_user_prompt(candidate, job)}
            ],
            "response_format": { "type": "json_object" }
        });

        let content = self.chat_openai(payload).await?;
        let score = Self::parse_score(content)?;
        tracing::info!(
            candidate_id = %candidate.id,
            job_id = %job.id,
            score = score.score,
            "ATS score received"
        );
        Ok(score)
    }
}
