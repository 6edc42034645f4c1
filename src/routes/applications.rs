use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{ApplyPayload, UpdateStatusPayload},
    error::Result,
    middleware::auth::{Claims, Role},
    models::application::Application,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<Application>),
        (status = 403, description = "Only students can apply"),
        (status = 404, description = "Candidate or job posting not found"),
        (status = 409, description = "An active application already exists")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    claims.require_role(&[Role::Student])?;
    let application = state
        .application_service
        .apply(claims.user_id()?, payload.job_id)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications/mine",
    responses(
        (status = 200, description = "Applications of the calling student", body = [Application])
    )
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    claims.require_role(&[Role::Student])?;
    let applications = state
        .application_service
        .list_for_candidate(claims.user_id()?)
        .await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = Json<Application>),
        (status = 403, description = "Caller may not view this application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(id).await?;
    let job = state.application_service.job(application.job_id).await?;
    claims.ensure_application_view(&application, &job)?;
    Ok(Json(application))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/withdraw",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 204, description = "Application withdrawn"),
        (status = 400, description = "Application can no longer be withdrawn"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn withdraw_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    claims.require_role(&[Role::Student])?;
    state
        .application_service
        .withdraw(id, claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<Application>),
        (status = 400, description = "Unknown status or missing rejection reason"),
        (status = 403, description = "Caller does not own the job posting"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    claims.require_role(&[Role::Recruiter, Role::Admin])?;
    payload.validate()?;
    let target = payload.target()?;

    let application = state.application_service.get(id).await?;
    let job = state.application_service.job(application.job_id).await?;
    claims.ensure_job_access(&job)?;

    let updated = state
        .transition_engine
        .apply_single_transition(
            id,
            target,
            payload.rejection_reason.as_deref(),
            payload.recruiter_notes.as_deref(),
        )
        .await?;
    Ok(Json(updated))
}
