//! Withdrawal request model: user-initiated payouts against withdrawable
//! balance, pending manual approval.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Possible states of a withdrawal request. Everything past `Pending` is
/// driven by the (external) admin payout process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "withdrawal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

/// Represents a withdrawal request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WithdrawalRequest {
    /// Unique identifier for this request.
    pub id: Uuid,
    /// User requesting the payout.
    pub user_id: Uuid,
    /// Amount to pay out.
    pub amount: BigDecimal,
    /// Destination account details (bank/UPI), stored as JSON.
    pub payout_details: serde_json::Value,
    /// Current request status.
    pub status: WithdrawalStatus,
    /// When this request was created.
    pub created_at: DateTime<Utc>,
    /// When this request was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new withdrawal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWithdrawalRequest {
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub payout_details: serde_json::Value,
}

impl WithdrawalRequest {
    /// Check if the request is awaiting admin review.
    pub fn is_pending(&self) -> bool {
        self.status == WithdrawalStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_withdrawal_status_serialization() {
        assert_eq!(
            serde_json::to_string(&WithdrawalStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&WithdrawalStatus::Paid).unwrap(),
            "\"paid\""
        );
    }

    #[test]
    fn test_new_withdrawal_request() {
        let user_id = Uuid::new_v4();
        let request = NewWithdrawalRequest {
            user_id,
            amount: BigDecimal::from_str("250.00").unwrap(),
            payout_details: json!({"upi": "someone@okbank"}),
        };

        assert_eq!(request.user_id, user_id);
        assert_eq!(request.payout_details["upi"], "someone@okbank");
    }

    #[test]
    fn test_is_pending() {
        let now = Utc::now();
        let request = WithdrawalRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: BigDecimal::from_str("250.00").unwrap(),
            payout_details: json!({}),
            status: WithdrawalStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        assert!(request.is_pending());
    }
}
