//! Notification domain type.

use chrono::{DateTime, Utc};

use verdant_core::{NotificationId, UserId};

/// A row in the user's notification feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
