use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::notification::{CreateNotification, Notification};

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: CreateNotification) -> Result<Notification>;

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>>;

    /// Returns `None` if the notification does not exist or belongs to someone else.
    async fn mark_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Notification>>;
}

#[derive(Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, notification: CreateNotification) -> Result<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, application_id, kind, title, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, application_id, kind, title, message, read_at, created_at
            "#,
        )
        .bind(notification.user_id)
        .bind(notification.application_id)
        .bind(notification.kind)
        .bind(notification.title)
        .bind(notification.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, application_id, kind, title, message, read_at, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC
            LIMIT 200
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read_at = COALESCE(read_at, $3)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, application_id, kind, title, message, read_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
