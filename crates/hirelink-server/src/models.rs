//! Database models for the Hirelink wallet service.

pub mod notification;
pub mod recharge_order;
pub mod referral_request;
pub mod wallet;
pub mod wallet_hold;
pub mod wallet_transaction;
pub mod withdrawal_request;

pub use notification::{NewNotification, Notification};
pub use recharge_order::{NewRechargeOrder, RechargeOrder, RechargeStatus};
pub use referral_request::{NewReferralRequest, ReferralRequest, ReferralStatus};
pub use wallet::{Wallet, WalletStatus};
pub use wallet_hold::{HoldStatus, NewWalletHold, WalletHold};
pub use wallet_transaction::{
    NewWalletTransaction, TransactionSource, TransactionType, WalletTransaction,
};
pub use withdrawal_request::{NewWithdrawalRequest, WithdrawalRequest, WithdrawalStatus};
