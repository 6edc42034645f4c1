mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use placement_backend::error::{Error, Result};
use placement_backend::models::application_status::ApplicationStatus;
use placement_backend::models::transition_event::TransitionEvent;
use placement_backend::services::notification_service::NotificationSink;
use placement_backend::services::transition_service::{TransitionEngine, MAX_BULK_IDS};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use common::Portal;

#[derive(Default)]
struct FlakySink {
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl NotificationSink for FlakySink {
    async fn dispatch(&self, _event: &TransitionEvent) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(Error::Internal("notification store offline".into()));
        }
        Ok(())
    }
}

fn engine(portal: &Portal, sink: Arc<FlakySink>) -> TransitionEngine {
    TransitionEngine::new(portal.store.clone(), sink)
}

#[tokio::test]
async fn notification_is_retried_after_commit() {
    let portal = Portal::new();
    let sink = Arc::new(FlakySink {
        failures_left: AtomicUsize::new(2),
        ..FlakySink::default()
    });
    let application = portal.application(ApplicationStatus::Shortlisted);

    let updated = assert_ok!(
        engine(&portal, sink.clone())
            .apply_single_transition(application.id, ApplicationStatus::Selected, None, None)
            .await
    );
    assert_eq!(updated.status, ApplicationStatus::Selected);
    assert!(updated.selected_at.is_some());
    assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_notification_retries_keep_the_transition() {
    let portal = Portal::new();
    let sink = Arc::new(FlakySink {
        failures_left: AtomicUsize::new(10),
        ..FlakySink::default()
    });
    let application = portal.application(ApplicationStatus::Applied);

    assert_ok!(
        engine(&portal, sink.clone())
            .apply_single_transition(
                application.id,
                ApplicationStatus::Rejected,
                Some("Did not clear the aptitude round"),
                None,
            )
            .await
    );
    assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    assert_eq!(portal.status_of(application.id), ApplicationStatus::Rejected);
}

#[tokio::test]
async fn failed_transitions_emit_nothing() {
    let portal = Portal::new();
    let sink = Arc::new(FlakySink::default());
    let engine = engine(&portal, sink.clone());
    let application = portal.application(ApplicationStatus::OnHold);

    let err = assert_err!(
        engine
            .apply_single_transition(application.id, ApplicationStatus::Selected, None, None)
            .await
    );
    assert_eq!(err.code(), "invalid_transition");

    let err = assert_err!(
        engine
            .apply_single_transition(Uuid::new_v4(), ApplicationStatus::Shortlisted, None, None)
            .await
    );
    assert_eq!(err.code(), "not_found");
    assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_batches_are_rejected_up_front() {
    let portal = Portal::new();
    let sink = Arc::new(FlakySink::default());
    let engine = engine(&portal, sink);
    let application = portal.application(ApplicationStatus::Applied);

    let mut ids: Vec<Uuid> = (0..MAX_BULK_IDS).map(|_| Uuid::new_v4()).collect();
    ids.push(application.id);
    let err = assert_err!(
        engine
            .apply_bulk_transition(&ids, ApplicationStatus::OnHold, None)
            .await
    );
    assert_eq!(err.code(), "validation_error");
    assert_eq!(portal.status_of(application.id), ApplicationStatus::Applied);

    let summary = assert_ok!(
        engine
            .apply_bulk_transition(&[application.id], ApplicationStatus::OnHold, None)
            .await
    );
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.succeeded[0].status, ApplicationStatus::OnHold);
}
