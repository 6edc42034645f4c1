use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::NotificationStore;
use crate::error::{Error, Result};
use crate::models::application_status::ApplicationStatus;
use crate::models::notification::{CreateNotification, Notification};
use crate::models::transition_event::{TransitionEvent, APPLICATION_STATUS_KIND};

/// Consumer of committed status changes.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn dispatch(&self, event: &TransitionEvent) -> Result<()>;
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub fn compose(event: &TransitionEvent) -> CreateNotification {
        let (title, message) = match event.to_status {
            ApplicationStatus::Shortlisted => (
                "You have been shortlisted".to_string(),
                "Your application has moved to the shortlist. The recruiter will reach out with next steps.".to_string(),
            ),
            ApplicationStatus::OnHold => (
                "Application on hold".to_string(),
                "The recruiter has put your application on hold for now.".to_string(),
            ),
            ApplicationStatus::Rejected => (
                "Application update".to_string(),
                "Your application was not taken forward this time.".to_string(),
            ),
            ApplicationStatus::Selected => (
                "Congratulations, you have been selected".to_string(),
                "You have been selected for this position.".to_string(),
            ),
            ApplicationStatus::Applied => (
                "Application received".to_string(),
                "Your application has been received.".to_string(),
            ),
        };

        CreateNotification {
            user_id: event.candidate_id,
            application_id: Some(event.application_id),
            kind: APPLICATION_STATUS_KIND.to_string(),
            title,
            message: format!(
                "{} (status: {} -> {})",
                message,
                event.from_status.label(),
                event.to_status.label()
            ),
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        self.store.list_for_user(user_id, unread_only).await
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification> {
        self.store
            .mark_read(id, user_id, Utc::now())
            .await?
            .ok_or_else(|| Error::NotFound("Notification not found".into()))
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn dispatch(&self, event: &TransitionEvent) -> Result<()> {
        let notification = self.store.insert(Self::compose(event)).await?;
        tracing::debug!(
            notification_id = %notification.id,
            application_id = %event.application_id,
            "notification created"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(to: ApplicationStatus) -> TransitionEvent {
        TransitionEvent {
            application_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            from_status: ApplicationStatus::Applied,
            to_status: to,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn notification_targets_the_candidate() {
        let ev = event(ApplicationStatus::Shortlisted);
        let n = NotificationService::compose(&ev);
        assert_eq!(n.user_id, ev.candidate_id);
        assert_eq!(n.application_id, Some(ev.application_id));
        assert_eq!(n.kind, APPLICATION_STATUS_KIND);
        assert!(n.message.contains("Applied -> Shortlisted"));
    }

    #[test]
    fn rejection_message_uses_status_labels() {
        let n = NotificationService::compose(&event(ApplicationStatus::Rejected));
        assert_eq!(n.title, "Application update");
        assert!(n.message.ends_with("(status: Applied -> Rejected)"));
    }
}
