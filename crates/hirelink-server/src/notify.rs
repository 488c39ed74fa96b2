//! Fire-and-forget in-app notifications.
//!
//! Notifications are recorded after the financial operation has committed.
//! An insert failure is logged and swallowed; it must never surface to the
//! caller or roll anything back.

use sqlx::PgPool;

use crate::models::NewNotification;

/// Records a notification for a user. Never fails.
pub async fn notify(pool: &PgPool, notification: NewNotification) {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, kind, title, body)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(notification.user_id)
    .bind(&notification.kind)
    .bind(&notification.title)
    .bind(&notification.body)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(
            "Failed to record {} notification for user {}: {}",
            notification.kind,
            notification.user_id,
            e
        );
    }
}
