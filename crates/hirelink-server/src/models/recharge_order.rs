//! Recharge order model for tracking wallet top-ups through the payment
//! gateway.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Possible states of a recharge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "recharge_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RechargeStatus {
    /// Order created with the gateway; payment not yet confirmed.
    Created,
    /// Payment verified, wallet credited.
    Paid,
    /// Payment failed or abandoned.
    Failed,
}

/// Represents a wallet recharge order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RechargeOrder {
    /// Unique identifier for this order.
    pub id: Uuid,
    /// User whose wallet will be credited.
    pub user_id: Uuid,
    /// Amount to credit on successful payment.
    pub amount: BigDecimal,
    /// Gateway-assigned order identifier.
    pub gateway_order_id: String,
    /// Gateway payment identifier, recorded at verification time. Unique
    /// across all orders, which makes crediting idempotent.
    pub gateway_payment_id: Option<String>,
    /// Current order status.
    pub status: RechargeStatus,
    /// When this order was created.
    pub created_at: DateTime<Utc>,
    /// When this order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new recharge order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRechargeOrder {
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub gateway_order_id: String,
}

impl RechargeOrder {
    /// Check if the order is still awaiting payment.
    pub fn is_created(&self) -> bool {
        self.status == RechargeStatus::Created
    }

    /// Check if the order has been paid and credited.
    pub fn is_paid(&self) -> bool {
        self.status == RechargeStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_recharge_status_serialization() {
        assert_eq!(
            serde_json::to_string(&RechargeStatus::Created).unwrap(),
            "\"created\""
        );
        assert_eq!(
            serde_json::to_string(&RechargeStatus::Paid).unwrap(),
            "\"paid\""
        );
        assert_eq!(
            serde_json::to_string(&RechargeStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_status_helpers() {
        let now = Utc::now();
        let order = RechargeOrder {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: BigDecimal::from_str("500.00").unwrap(),
            gateway_order_id: "order_MkWvmPxz1azGQs".to_string(),
            gateway_payment_id: None,
            status: RechargeStatus::Created,
            created_at: now,
            updated_at: now,
        };

        assert!(order.is_created());
        assert!(!order.is_paid());

        let paid = RechargeOrder {
            status: RechargeStatus::Paid,
            gateway_payment_id: Some("pay_MkWw7Qf3bzXhEJ".to_string()),
            ..order
        };
        assert!(paid.is_paid());
        assert!(!paid.is_created());
    }
}
