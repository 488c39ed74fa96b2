//! Wallet transaction model: the append-only ledger of credits and debits.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money entering the wallet.
    Credit,
    /// Money leaving the wallet.
    Debit,
}

/// What produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "transaction_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    /// Verified gateway top-up.
    Recharge,
    /// Referrer's earnings for a completed referral.
    ReferralPayout,
    /// A hold settled into a debit on referral completion.
    HoldConversion,
    /// Funds moved out for a withdrawal request.
    Withdrawal,
    /// Admin adjustment.
    Manual,
}

/// Represents an immutable ledger entry. Rows are inserted once and never
/// updated or deleted; the wallet's stored balance equals the signed sum of
/// its entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalletTransaction {
    /// Unique identifier for this ledger entry.
    pub id: Uuid,
    /// The wallet this entry belongs to.
    pub wallet_id: Uuid,
    /// Credit or debit.
    pub tx_type: TransactionType,
    /// Amount, always positive; direction comes from `tx_type`.
    pub amount: BigDecimal,
    /// What produced this entry.
    pub source: TransactionSource,
    /// Human-readable description for history display.
    pub description: String,
    /// When this entry was recorded (immutable).
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWalletTransaction {
    pub wallet_id: Uuid,
    pub tx_type: TransactionType,
    pub amount: BigDecimal,
    pub source: TransactionSource,
    pub description: String,
}

impl WalletTransaction {
    /// The entry's contribution to the wallet balance: positive for
    /// credits, negative for debits.
    pub fn signed_amount(&self) -> BigDecimal {
        match self.tx_type {
            TransactionType::Credit => self.amount.clone(),
            TransactionType::Debit => -self.amount.clone(),
        }
    }
}

impl NewWalletTransaction {
    /// Create a new credit entry.
    pub fn credit(
        wallet_id: Uuid,
        amount: BigDecimal,
        source: TransactionSource,
        description: String,
    ) -> Self {
        Self {
            wallet_id,
            tx_type: TransactionType::Credit,
            amount,
            source,
            description,
        }
    }

    /// Create a new debit entry.
    pub fn debit(
        wallet_id: Uuid,
        amount: BigDecimal,
        source: TransactionSource,
        description: String,
    ) -> Self {
        Self {
            wallet_id,
            tx_type: TransactionType::Debit,
            amount,
            source,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Credit).unwrap(),
            "\"credit\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionType::Debit).unwrap(),
            "\"debit\""
        );
    }

    #[test]
    fn test_transaction_source_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionSource::Recharge).unwrap(),
            "\"recharge\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionSource::ReferralPayout).unwrap(),
            "\"referral_payout\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionSource::HoldConversion).unwrap(),
            "\"hold_conversion\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionSource::Withdrawal).unwrap(),
            "\"withdrawal\""
        );
    }

    #[test]
    fn test_credit_constructor() {
        let wallet_id = Uuid::new_v4();
        let amount = BigDecimal::from_str("500.00").unwrap();
        let entry = NewWalletTransaction::credit(
            wallet_id,
            amount.clone(),
            TransactionSource::Recharge,
            "Wallet recharge".to_string(),
        );

        assert_eq!(entry.wallet_id, wallet_id);
        assert_eq!(entry.tx_type, TransactionType::Credit);
        assert_eq!(entry.amount, amount);
        assert_eq!(entry.source, TransactionSource::Recharge);
    }

    #[test]
    fn test_debit_constructor() {
        let entry = NewWalletTransaction::debit(
            Uuid::new_v4(),
            BigDecimal::from_str("400.00").unwrap(),
            TransactionSource::HoldConversion,
            "Referral reward settlement".to_string(),
        );

        assert_eq!(entry.tx_type, TransactionType::Debit);
        assert_eq!(entry.source, TransactionSource::HoldConversion);
    }

    #[test]
    fn test_signed_amount() {
        let wallet_id = Uuid::new_v4();
        let now = Utc::now();

        let credit = WalletTransaction {
            id: Uuid::new_v4(),
            wallet_id,
            tx_type: TransactionType::Credit,
            amount: BigDecimal::from_str("100.00").unwrap(),
            source: TransactionSource::Recharge,
            description: String::new(),
            created_at: now,
        };
        let debit = WalletTransaction {
            id: Uuid::new_v4(),
            wallet_id,
            tx_type: TransactionType::Debit,
            amount: BigDecimal::from_str("40.00").unwrap(),
            source: TransactionSource::Withdrawal,
            description: String::new(),
            created_at: now,
        };

        assert_eq!(credit.signed_amount(), BigDecimal::from_str("100.00").unwrap());
        assert_eq!(debit.signed_amount(), BigDecimal::from_str("-40.00").unwrap());

        // The running balance is the signed sum of entries.
        assert_eq!(
            credit.signed_amount() + debit.signed_amount(),
            BigDecimal::from_str("60.00").unwrap()
        );
    }
}
