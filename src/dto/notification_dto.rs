use serde::{Deserialize, Serialize};

use crate::models::notification::Notification;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    pub unread_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResponse {
    pub items: Vec<Notification>,
    pub unread: usize,
}

impl From<Vec<Notification>> for NotificationListResponse {
    fn from(items: Vec<Notification>) -> Self {
        let unread = items.iter().filter(|n| n.read_at.is_none()).count();
        Self { items, unread }
    }
}
