#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use placement_backend::{
    database::InMemoryStore,
    error::{Error, Result},
    middleware::auth::Claims,
    models::{
        application::{Application, AtsScore, Recommendation},
        application_status::ApplicationStatus,
        candidate::CandidateProfile,
        job_posting::JobPosting,
    },
    routes,
    services::scoring_service::{Scorer, ScoringSettings},
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";

static INIT: Once = Once::new();

pub fn init_config() {
    INIT.call_once(|| {
        env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        env::set_var("DATABASE_URL", "postgres://localhost/placement_test");
        env::set_var("JWT_SECRET", JWT_SECRET);
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("API_RPS", "1000");
        placement_backend::config::init_config().expect("init config");
    });
}

pub fn token(sub: Uuid, role: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

/// Scorer returning preset scores keyed by candidate id.
#[derive(Default)]
pub struct FixedScorer {
    pub scores: HashMap<Uuid, u8>,
    pub failing: HashSet<Uuid>,
    pub delay: Option<Duration>,
}

#[async_trait]
impl Scorer for FixedScorer {
    async fn score(&self, candidate: &CandidateProfile, _job: &JobPosting) -> Result<AtsScore> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&candidate.id) {
            return Err(Error::Upstream("scoring service unavailable".into()));
        }
        let score = self.scores.get(&candidate.id).copied().unwrap_or(50);
        Ok(AtsScore {
            score,
            recommendation: Recommendation::from_score(score),
            strengths: vec!["Relevant coursework".into()],
            weaknesses: vec![],
        })
    }
}

pub struct Portal {
    pub store: Arc<InMemoryStore>,
    pub recruiter: Uuid,
    pub job: JobPosting,
}

impl Portal {
    pub fn new() -> Self {
        init_config();
        let store = Arc::new(InMemoryStore::new());
        let recruiter = Uuid::new_v4();
        let job = JobPosting {
            id: Uuid::new_v4(),
            recruiter_id: recruiter,
            title: "Graduate Software Engineer".into(),
            company: "Acme Labs".into(),
            description: Some("Backend services in Rust".into()),
            requirements: Some("Data structures, SQL".into()),
            required_skills: vec!["rust".into(), "sql".into()],
            min_cgpa: None,
            created_at: chrono::Utc::now(),
        };
        store.add_job(job.clone()).expect("seed job");
        Self {
            store,
            recruiter,
            job,
        }
    }

    pub fn candidate(&self, name: &str) -> CandidateProfile {
        let candidate = CandidateProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@campus.edu", name.to_lowercase()),
            department: Some("CSE".into()),
            graduation_year: Some(2026),
            cgpa: None,
            skills: vec!["rust".into()],
            resume_text: Some(format!("{} built a compiler in their final year.", name)),
        };
        self.store
            .add_candidate(candidate.clone())
            .expect("seed candidate");
        candidate
    }

    /// Seeds an application for a fresh candidate in the given status.
    pub fn application(&self, status: ApplicationStatus) -> Application {
        let candidate = self.candidate(&format!("Student{}", &Uuid::new_v4().simple().to_string()[..6]));
        let mut application = Application::new(candidate.id, self.job.id, chrono::Utc::now());
        application.status = status;
        if status == ApplicationStatus::Rejected {
            application.rejection_reason = Some("Seeded".into());
        }
        self.store
            .put_application(application.clone())
            .expect("seed application");
        application
    }

    pub fn router(&self, scorer: FixedScorer, settings: ScoringSettings) -> Router {
        let state = AppState::from_parts(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            Arc::new(scorer),
            settings,
        );
        routes::router(state)
    }

    pub fn default_router(&self) -> Router {
        self.router(FixedScorer::default(), ScoringSettings::default())
    }

    pub fn recruiter_token(&self) -> String {
        token(self.recruiter, "recruiter")
    }

    pub fn status_of(&self, id: Uuid) -> ApplicationStatus {
        self.store
            .snapshot(id)
            .expect("snapshot")
            .expect("application exists")
            .status
    }
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
