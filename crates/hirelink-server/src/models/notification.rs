//! In-app notification model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An in-app notification shown to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Machine-readable kind tag (wallet_credited, hold_converted, ...).
    pub kind: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
}

impl NewNotification {
    pub fn new(user_id: Uuid, kind: &str, title: String, body: String) -> Self {
        Self {
            user_id,
            kind: kind.to_string(),
            title,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification() {
        let user_id = Uuid::new_v4();
        let n = NewNotification::new(
            user_id,
            "wallet_credited",
            "Wallet recharged".to_string(),
            "500.00 added to your wallet".to_string(),
        );

        assert_eq!(n.user_id, user_id);
        assert_eq!(n.kind, "wallet_credited");
    }
}
