//! Wallet hold model: a provisional reservation of funds against a claimed
//! referral request.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Possible states of a hold in its lifecycle.
///
/// A hold starts `Active` and ends in exactly one of the terminal states:
/// `Converted` when the referral completes (the amount becomes a real
/// debit), or `Released` when the referral is cancelled (nothing is
/// debited).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "hold_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HoldStatus {
    /// Funds are currently reserved and reduce the available balance.
    Active,
    /// The reservation became a debit; a ledger entry exists for it.
    Converted,
    /// The reservation was cancelled without a debit.
    Released,
}

/// Represents a hold against a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalletHold {
    /// Unique identifier for this hold.
    pub id: Uuid,
    /// The wallet the funds are reserved against.
    pub wallet_id: Uuid,
    /// Amount reserved.
    pub amount: BigDecimal,
    /// Current lifecycle state.
    pub status: HoldStatus,
    /// The referral request this hold backs.
    pub referral_request_id: Uuid,
    /// When this hold was created.
    pub created_at: DateTime<Utc>,
    /// When the hold was converted or released (null while active).
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Data required to create a new hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWalletHold {
    pub wallet_id: Uuid,
    pub amount: BigDecimal,
    pub referral_request_id: Uuid,
}

impl WalletHold {
    /// Check if the hold is still reserving funds.
    pub fn is_active(&self) -> bool {
        self.status == HoldStatus::Active
    }

    /// Check if the hold was converted into a debit.
    pub fn is_converted(&self) -> bool {
        self.status == HoldStatus::Converted
    }

    /// Check if the hold was released without a debit.
    pub fn is_released(&self) -> bool {
        self.status == HoldStatus::Released
    }

    /// Check if the hold is in a terminal state. Terminal holds admit no
    /// further transitions.
    pub fn is_terminal(&self) -> bool {
        self.is_converted() || self.is_released()
    }
}

impl NewWalletHold {
    /// Create a new hold for a claimed referral request.
    pub fn new(wallet_id: Uuid, amount: BigDecimal, referral_request_id: Uuid) -> Self {
        Self {
            wallet_id,
            amount,
            referral_request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn test_hold(status: HoldStatus) -> WalletHold {
        WalletHold {
            id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            amount: BigDecimal::from_str("400.00").unwrap(),
            status,
            referral_request_id: Uuid::new_v4(),
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_hold_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HoldStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&HoldStatus::Converted).unwrap(),
            "\"converted\""
        );
        assert_eq!(
            serde_json::to_string(&HoldStatus::Released).unwrap(),
            "\"released\""
        );
    }

    #[test]
    fn test_hold_status_deserialization() {
        assert_eq!(
            serde_json::from_str::<HoldStatus>("\"active\"").unwrap(),
            HoldStatus::Active
        );
        assert_eq!(
            serde_json::from_str::<HoldStatus>("\"converted\"").unwrap(),
            HoldStatus::Converted
        );
    }

    #[test]
    fn test_active_hold_is_not_terminal() {
        let hold = test_hold(HoldStatus::Active);
        assert!(hold.is_active());
        assert!(!hold.is_converted());
        assert!(!hold.is_released());
        assert!(!hold.is_terminal());
    }

    #[test]
    fn test_converted_and_released_are_terminal() {
        let converted = test_hold(HoldStatus::Converted);
        assert!(converted.is_terminal());
        assert!(converted.is_converted());
        assert!(!converted.is_released());

        let released = test_hold(HoldStatus::Released);
        assert!(released.is_terminal());
        assert!(released.is_released());
        assert!(!released.is_converted());
    }

    #[test]
    fn test_hold_serialization() {
        let hold = test_hold(HoldStatus::Active);
        let json = serde_json::to_value(&hold).unwrap();

        assert_eq!(json["id"], hold.id.to_string());
        assert_eq!(json["status"], "active");
        assert!(json["resolved_at"].is_null());
    }
}
