use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::notification_dto::{NotificationListQuery, NotificationListResponse},
    error::Result,
    middleware::auth::Claims,
    models::notification::Notification,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications")
    ),
    responses(
        (status = 200, description = "Notifications of the caller, newest first", body = Json<NotificationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse> {
    let items = state
        .notification_service
        .list_for_user(claims.user_id()?, query.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(NotificationListResponse::from(items)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Json<Notification>),
        (status = 404, description = "Notification not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let notification = state
        .notification_service
        .mark_read(id, claims.user_id()?)
        .await?;
    Ok(Json(notification))
}
