use std::str::FromStr;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::job_posting::JobPosting;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Recruiter,
    Alumni,
    Admin,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "recruiter" => Ok(Role::Recruiter),
            "alumni" => Ok(Role::Alumni),
            "admin" => Ok(Role::Admin),
            other => Err(Error::Forbidden(format!("Unknown role '{}'", other))),
        }
    }
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| Error::Unauthorized("Token subject is not a valid user id".into()))
    }

    pub fn role(&self) -> Result<Role> {
        self.role
            .as_deref()
            .ok_or_else(|| Error::Forbidden("Token carries no role".into()))?
            .parse()
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<Role> {
        let role = self.role()?;
        if allowed.contains(&role) {
            Ok(role)
        } else {
            Err(Error::Forbidden("forbidden".into()))
        }
    }

    /// Only the recruiter who owns the posting, or an admin, may act on its
    /// applications.
    pub fn ensure_job_access(&self, job: &JobPosting) -> Result<()> {
        match self.require_role(&[Role::Recruiter, Role::Admin])? {
            Role::Admin => Ok(()),
            _ if self.user_id()? == job.recruiter_id => Ok(()),
            _ => Err(Error::Forbidden(
                "Only the recruiter who owns this job posting may manage its applications".into(),
            )),
        }
    }

    /// Viewing one application: its candidate, the owning recruiter, or an admin.
    pub fn ensure_application_view(&self, application: &Application, job: &JobPosting) -> Result<()> {
        match self.role()? {
            Role::Student if self.user_id()? == application.candidate_id => Ok(()),
            Role::Recruiter | Role::Admin => self.ensure_job_access(job),
            _ => Err(Error::Forbidden("forbidden".into())),
        }
    }
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code, "code": "unauthorized" })))
        .into_response()
}

pub fn decode_bearer(auth_header: Option<&str>, secret: &str) -> std::result::Result<Claims, &'static str> {
    let Some(auth_str) = auth_header else {
        return Err("missing_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err("unsupported_scheme");
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| "invalid_token")
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let header = match req.headers().get(axum::http::header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(s) => Some(s.to_string()),
            Err(_) => return unauthorized("bad_authorization"),
        },
        None => None,
    };

    let config = crate::config::get_config();
    match decode_bearer(header.as_deref(), &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(code) => unauthorized(code),
    }
}
