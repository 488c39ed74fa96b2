//! Wallet model: one balance-bearing account per user.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Operational status of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "wallet_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    /// Wallet can transact normally.
    Active,
    /// Wallet is frozen; no balance-mutating operations are allowed.
    Suspended,
}

/// Represents a user's wallet. Created lazily on first access with zero
/// balances.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    /// Unique identifier for this wallet.
    pub id: Uuid,
    /// The owning user. Exactly one wallet exists per user.
    pub user_id: Uuid,
    /// Stored balance. Equals the signed sum of the transaction ledger.
    pub balance: BigDecimal,
    /// The referral-earned subset of balance eligible for payout.
    pub withdrawable_balance: BigDecimal,
    /// Current wallet status.
    pub status: WalletStatus,
    /// When this wallet was created.
    pub created_at: DateTime<Utc>,
    /// When this wallet was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Returns true if the wallet can take part in balance-mutating
    /// operations.
    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }

    /// The spendable amount once active holds are accounted for.
    pub fn available_balance(&self, hold_amount: &BigDecimal) -> BigDecimal {
        &self.balance - hold_amount
    }

    /// Returns true if the wallet can cover `amount` after holds.
    pub fn has_available(&self, hold_amount: &BigDecimal, amount: &BigDecimal) -> bool {
        &self.available_balance(hold_amount) >= amount
    }
}
