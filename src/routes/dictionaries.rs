use axum::{response::IntoResponse, Json};

use crate::dto::application_dto::StatusDictionaryEntry;
use crate::models::application_status::ApplicationStatus;

#[utoipa::path(
    get,
    path = "/api/dictionaries/application-statuses",
    responses(
        (status = 200, description = "Application statuses with labels and legal successors", body = [StatusDictionaryEntry])
    )
)]
#[axum::debug_handler]
pub async fn list_application_statuses() -> impl IntoResponse {
    let entries: Vec<StatusDictionaryEntry> = ApplicationStatus::ALL
        .into_iter()
        .map(StatusDictionaryEntry::from)
        .collect();
    Json(entries)
}
