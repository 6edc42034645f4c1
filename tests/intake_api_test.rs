mod common;

use axum::http::StatusCode;
use placement_backend::models::application_status::ApplicationStatus;
use serde_json::json;
use uuid::Uuid;

use common::{send, token, Portal};

#[tokio::test]
async fn student_applies_once_per_job() {
    let portal = Portal::new();
    let app = portal.default_router();
    let student = portal.candidate("Ananya");
    let bearer = token(student.id, "student");

    let (status, body) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&bearer),
        Some(json!({ "job_id": portal.job.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["candidate_id"], student.id.to_string());
    assert!(body["shortlisted_at"].is_null());
    assert!(body["ats_score"].is_null());

    let (status, body) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&bearer),
        Some(json!({ "job_id": portal.job.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, body) = send(&app, "GET", "/api/applications/mine", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn applying_to_unknown_job_or_as_recruiter_fails() {
    let portal = Portal::new();
    let app = portal.default_router();
    let student = portal.candidate("Rohan");

    let (status, body) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&token(student.id, "student")),
        Some(json!({ "job_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&portal.recruiter_token()),
        Some(json!({ "job_id": portal.job.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn withdrawal_hides_the_application_and_frees_the_pair() {
    let portal = Portal::new();
    let app = portal.default_router();
    let application = portal.application(ApplicationStatus::OnHold);
    let bearer = token(application.candidate_id, "student");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/withdraw", application.id),
        Some(&bearer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = portal.store.snapshot(application.id).unwrap().unwrap();
    assert!(stored.withdrawn_at.is_some());
    assert_eq!(stored.status, ApplicationStatus::OnHold);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/applications/{}", application.id),
        Some(&bearer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/status", application.id),
        Some(&portal.recruiter_token()),
        Some(json!({ "status": "shortlisted" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&bearer),
        Some(json!({ "job_id": portal.job.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["id"], application.id.to_string());
}

#[tokio::test]
async fn withdrawal_after_a_decision_is_refused() {
    let portal = Portal::new();
    let app = portal.default_router();

    for seeded in [ApplicationStatus::Shortlisted, ApplicationStatus::Selected, ApplicationStatus::Rejected] {
        let application = portal.application(seeded);
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/applications/{}/withdraw", application.id),
            Some(&token(application.candidate_id, "student")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "seeded {}", seeded);
        assert_eq!(body["code"], "validation_error");
        let stored = portal.store.snapshot(application.id).unwrap().unwrap();
        assert!(stored.withdrawn_at.is_none());
    }
}

#[tokio::test]
async fn other_students_cannot_see_or_withdraw() {
    let portal = Portal::new();
    let app = portal.default_router();
    let application = portal.application(ApplicationStatus::Applied);
    let intruder = token(Uuid::new_v4(), "student");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/applications/{}/withdraw", application.id),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/applications/{}", application.id),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/applications/{}", application.id),
        Some(&token(application.candidate_id, "student")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], application.id.to_string());
}

#[tokio::test]
async fn candidate_reads_and_acknowledges_notifications() {
    let portal = Portal::new();
    let app = portal.default_router();
    let application = portal.application(ApplicationStatus::Applied);
    let bearer = token(application.candidate_id, "student");

    send(
        &app,
        "POST",
        &format!("/api/applications/{}/status", application.id),
        Some(&portal.recruiter_token()),
        Some(json!({ "status": "on-hold" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/notifications?unread_only=true", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 1);
    let id = body["items"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(body["items"][0]["title"], "Application on hold");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/notifications/{}/read", id),
        Some(&bearer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["read_at"].is_string());

    let (_, body) = send(&app, "GET", "/api/notifications?unread_only=true", Some(&bearer), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/notifications/{}/read", id),
        Some(&portal.recruiter_token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
