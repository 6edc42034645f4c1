use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListQuery, BulkStatusPayload, BulkStatusResponse, RecalculatePayload,
        StatusCountsResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::application::Application,
    services::scoring_service::RecalculationSummary,
    AppState,
};

async fn authorize_job(state: &AppState, claims: &Claims, job_id: Uuid) -> Result<()> {
    let job = state.application_service.job(job_id).await?;
    claims.ensure_job_access(&job)
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    params(
        ("id" = Uuid, Path, description = "Job posting ID"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Active applications for the job", body = [Application]),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Caller does not own the job posting")
    )
)]
#[axum::debug_handler]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let status = query.status_filter()?;
    authorize_job(&state, &claims, job_id).await?;
    let applications = state
        .application_service
        .list_for_job(job_id, status)
        .await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications/stats",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Application counts per status", body = Json<StatusCountsResponse>),
        (status = 403, description = "Caller does not own the job posting")
    )
)]
#[axum::debug_handler]
pub async fn application_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    authorize_job(&state, &claims, job_id).await?;
    let counts = state.application_service.status_counts(job_id).await?;
    Ok(Json(StatusCountsResponse::new(job_id, counts)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/applications/status",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    request_body = BulkStatusPayload,
    responses(
        (status = 200, description = "Per-application outcome", body = Json<BulkStatusResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller does not own the job posting"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn bulk_update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let target = payload.target()?;
    authorize_job(&state, &claims, job_id).await?;

    let summary = state
        .transition_engine
        .apply_bulk_transition_in_job(
            job_id,
            &payload.application_ids,
            target,
            payload.rejection_reason.as_deref(),
        )
        .await?;
    Ok(Json(BulkStatusResponse::new(
        payload.application_ids.len(),
        summary,
    )))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/ats/recalculate",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    request_body = RecalculatePayload,
    responses(
        (status = 200, description = "Scoring summary", body = Json<RecalculationSummary>),
        (status = 400, description = "Threshold outside 0-100"),
        (status = 403, description = "Caller does not own the job posting"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn recalculate_ats_scores(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
    payload: Option<Json<RecalculatePayload>>,
) -> Result<impl IntoResponse> {
    authorize_job(&state, &claims, job_id).await?;
    let threshold = payload.and_then(|Json(p)| p.auto_shortlist_threshold);
    let summary = state
        .scoring_trigger
        .recalculate_scores(job_id, threshold)
        .await?;
    Ok(Json(summary))
}
