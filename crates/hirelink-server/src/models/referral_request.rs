//! Referral request model: a paid referral offer whose reward is reserved
//! in a wallet hold while the referral is in flight.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Lifecycle states of a referral request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "referral_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    /// Posted by a seeker, waiting for a referrer to claim it.
    Open,
    /// Claimed by a referrer; the reward is held against the seeker's
    /// wallet.
    Claimed,
    /// Referral verified complete; the hold was converted and the referrer
    /// paid.
    Completed,
    /// Cancelled before completion; the hold was released.
    Cancelled,
}

/// Represents a referral request on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReferralRequest {
    /// Unique identifier for this request.
    pub id: Uuid,
    /// The job seeker offering the reward.
    pub seeker_id: Uuid,
    /// The referrer who claimed the request (null while open).
    pub referrer_id: Option<Uuid>,
    /// Reward offered for a successful referral.
    pub reward_amount: BigDecimal,
    /// Target job title.
    pub job_title: String,
    /// Target company.
    pub company: String,
    /// Current lifecycle state.
    pub status: ReferralStatus,
    /// The hold reserving the reward (null while open).
    pub hold_id: Option<Uuid>,
    /// When this request was created.
    pub created_at: DateTime<Utc>,
    /// When this request was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new referral request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReferralRequest {
    pub seeker_id: Uuid,
    pub reward_amount: BigDecimal,
    pub job_title: String,
    pub company: String,
}

impl ReferralRequest {
    pub fn is_open(&self) -> bool {
        self.status == ReferralStatus::Open
    }

    pub fn is_claimed(&self) -> bool {
        self.status == ReferralStatus::Claimed
    }

    /// Terminal requests admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ReferralStatus::Completed | ReferralStatus::Cancelled
        )
    }
}
