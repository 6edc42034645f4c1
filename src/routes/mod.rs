pub mod applications;
pub mod dictionaries;
pub mod health;
pub mod jobs;
pub mod notifications;

use axum::{
    routing::{get, post},
    Router,
};

use crate::middleware::auth::require_bearer_auth;
use crate::AppState;

/// Every route of the service with state attached; outer layers (rate limit,
/// CORS, tracing, body limit) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/dictionaries/application-statuses",
            get(dictionaries::list_application_statuses),
        );

    let protected = Router::new()
        .route("/api/applications", post(applications::apply))
        .route("/api/applications/mine", get(applications::list_my_applications))
        .route("/api/applications/:id", get(applications::get_application))
        .route(
            "/api/applications/:id/withdraw",
            post(applications::withdraw_application),
        )
        .route(
            "/api/applications/:id/status",
            post(applications::update_application_status),
        )
        .route(
            "/api/jobs/:id/applications",
            get(jobs::list_job_applications),
        )
        .route(
            "/api/jobs/:id/applications/status",
            post(jobs::bulk_update_status),
        )
        .route(
            "/api/jobs/:id/applications/stats",
            get(jobs::application_stats),
        )
        .route(
            "/api/jobs/:id/ats/recalculate",
            post(jobs::recalculate_ats_scores),
        )
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/:id/read",
            post(notifications::mark_notification_read),
        )
        .route_layer(axum::middleware::from_fn(require_bearer_auth));

    public.merge(protected).with_state(state)
}
