//! Referral marketplace endpoints.
//!
//! The referral lifecycle drives the hold state machine: claiming a
//! request reserves the seeker's reward in a hold, completion converts the
//! hold and pays the referrer, cancellation releases it.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    NewNotification, ReferralRequest, ReferralStatus, TransactionSource,
};
use crate::notify::notify;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::wallet_ops;

/// Minimum referral reward.
const MIN_REWARD_AMOUNT: &str = "50.00";

/// Maximum referral reward.
const MAX_REWARD_AMOUNT: &str = "100000.00";

/// Request body for posting a referral request.
/// Note: In production, the user id would come from authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralRequest {
    pub user_id: Uuid,
    /// Reward offered for a successful referral.
    pub reward_amount: String,
    /// Target job title.
    pub job_title: String,
    /// Target company.
    pub company: String,
}

/// Request body for claim/complete/cancel actions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralActionRequest {
    pub user_id: Uuid,
}

/// A referral request as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub id: Uuid,
    pub seeker_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<Uuid>,
    pub reward_amount: String,
    pub job_title: String,
    pub company: String,
    pub status: ReferralStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_id: Option<Uuid>,
    pub created_at: String,
}

impl From<ReferralRequest> for ReferralRecord {
    fn from(request: ReferralRequest) -> Self {
        Self {
            id: request.id,
            seeker_id: request.seeker_id,
            referrer_id: request.referrer_id,
            reward_amount: request.reward_amount.to_string(),
            job_title: request.job_title,
            company: request.company,
            status: request.status,
            hold_id: request.hold_id,
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

/// Creates the referrals router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_referral))
        .route("/{id}/claim", post(claim_referral))
        .route("/{id}/complete", post(complete_referral))
        .route("/{id}/cancel", post(cancel_referral))
        .with_state(state)
}

/// Validates the reward amount is within acceptable bounds.
fn validate_reward_amount(amount: &BigDecimal) -> Result<(), AppError> {
    let min = BigDecimal::from_str(MIN_REWARD_AMOUNT).unwrap();
    let max = BigDecimal::from_str(MAX_REWARD_AMOUNT).unwrap();

    if amount < &min {
        return Err(AppError::Validation(format!(
            "Minimum referral reward is {}",
            MIN_REWARD_AMOUNT
        )));
    }

    if amount > &max {
        return Err(AppError::Validation(format!(
            "Maximum referral reward is {}",
            MAX_REWARD_AMOUNT
        )));
    }

    Ok(())
}

/// Validates a free-text field is non-empty and within length limits.
fn validate_text_field(value: &str, field: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if trimmed.len() > 200 {
        return Err(AppError::Validation(format!(
            "{} must be 200 characters or less",
            field
        )));
    }
    Ok(())
}

/// Loads a referral request by id.
async fn load_referral(pool: &sqlx::PgPool, id: Uuid) -> Result<ReferralRequest, AppError> {
    let request: Option<ReferralRequest> = sqlx::query_as(
        r#"
        SELECT id, seeker_id, referrer_id, reward_amount, job_title, company, status, hold_id, created_at, updated_at
        FROM referral_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    request.ok_or_else(|| AppError::NotFound(format!("Referral request not found: {}", id)))
}

/// POST /api/v1/referrals
///
/// Posts a new referral request. No funds move until a referrer claims it.
async fn create_referral(
    State(state): State<AppState>,
    Json(request): Json<CreateReferralRequest>,
) -> Result<Json<ApiResponse<ReferralRecord>>, AppError> {
    // Step 1: Validate fields
    validate_text_field(&request.job_title, "Job title")?;
    validate_text_field(&request.company, "Company")?;

    let reward_amount = BigDecimal::from_str(&request.reward_amount)
        .map_err(|e| AppError::Validation(format!("Invalid reward amount format: {}", e)))?;
    validate_reward_amount(&reward_amount)?;

    // Step 2: Insert the open request
    let created: ReferralRequest = sqlx::query_as(
        r#"
        INSERT INTO referral_requests (seeker_id, reward_amount, job_title, company, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, seeker_id, referrer_id, reward_amount, job_title, company, status, hold_id, created_at, updated_at
        "#,
    )
    .bind(request.user_id)
    .bind(&reward_amount)
    .bind(request.job_title.trim())
    .bind(request.company.trim())
    .bind(ReferralStatus::Open)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::ok(created.into())))
}

/// POST /api/v1/referrals/{id}/claim
///
/// Claims an open referral request. The reward is reserved against the
/// seeker's wallet in a hold; if the seeker's available balance cannot
/// cover it, the claim fails and the request stays open.
async fn claim_referral(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReferralActionRequest>,
) -> Result<Json<ApiResponse<ReferralRecord>>, AppError> {
    // Step 1: Load and sanity-check the request
    let referral = load_referral(&state.pool, id).await?;
    if referral.seeker_id == request.user_id {
        return Err(AppError::Validation(
            "Cannot claim your own referral request".to_string(),
        ));
    }

    // Step 2: Claim and create the hold atomically. The open -> claimed
    // transition is guarded in the WHERE clause, so concurrent claims race
    // on the row and only one wins; a failed hold rolls the claim back.
    let mut tx = state.pool.begin().await?;

    let claimed: Option<ReferralRequest> = sqlx::query_as(
        r#"
        UPDATE referral_requests
        SET status = 'claimed', referrer_id = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'open'
        RETURNING id, seeker_id, referrer_id, reward_amount, job_title, company, status, hold_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(request.user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let claimed = claimed.ok_or_else(|| {
        AppError::Validation("Referral request is not open for claiming".to_string())
    })?;

    let hold =
        wallet_ops::create_hold_in_tx(&mut tx, claimed.seeker_id, &claimed.reward_amount, id)
            .await?;

    sqlx::query(
        r#"
        UPDATE referral_requests
        SET hold_id = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(hold.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    // Step 3: Notify the seeker
    notify(
        &state.pool,
        NewNotification::new(
            claimed.seeker_id,
            "referral_claimed",
            "Referral request claimed".to_string(),
            format!(
                "Your referral request for {} at {} was claimed; {} is now on hold",
                claimed.job_title, claimed.company, claimed.reward_amount
            ),
        ),
    )
    .await;

    let record = ReferralRecord {
        hold_id: Some(hold.id),
        ..claimed.into()
    };
    Ok(Json(ApiResponse::ok(record)))
}

/// POST /api/v1/referrals/{id}/complete
///
/// Marks a claimed referral complete: the hold converts into a debit on
/// the seeker's wallet and the referrer is paid the reward as withdrawable
/// balance, all in one transaction.
async fn complete_referral(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReferralActionRequest>,
) -> Result<Json<ApiResponse<ReferralRecord>>, AppError> {
    // Step 1: Load and authorize
    let referral = load_referral(&state.pool, id).await?;
    if referral.seeker_id != request.user_id {
        return Err(AppError::Authorization(
            "Only the seeker can complete a referral request".to_string(),
        ));
    }

    // Step 2: Settle atomically
    let mut tx = state.pool.begin().await?;

    let completed: Option<ReferralRequest> = sqlx::query_as(
        r#"
        UPDATE referral_requests
        SET status = 'completed', updated_at = NOW()
        WHERE id = $1 AND status = 'claimed'
        RETURNING id, seeker_id, referrer_id, reward_amount, job_title, company, status, hold_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let completed = completed.ok_or_else(|| {
        AppError::Validation("Referral request is not in a claimed state".to_string())
    })?;

    let hold_id = completed
        .hold_id
        .ok_or_else(|| AppError::Internal(format!("Claimed referral {} has no hold", id)))?;
    let referrer_id = completed
        .referrer_id
        .ok_or_else(|| AppError::Internal(format!("Claimed referral {} has no referrer", id)))?;

    wallet_ops::convert_hold_in_tx(
        &mut tx,
        completed.seeker_id,
        hold_id,
        format!(
            "Referral reward settlement for {} at {}",
            completed.job_title, completed.company
        ),
    )
    .await?;

    wallet_ops::credit_wallet_in_tx(
        &mut tx,
        referrer_id,
        &completed.reward_amount,
        TransactionSource::ReferralPayout,
        format!(
            "Referral payout for {} at {}",
            completed.job_title, completed.company
        ),
    )
    .await?;

    tx.commit().await?;

    // Step 3: Notify both sides
    notify(
        &state.pool,
        NewNotification::new(
            completed.seeker_id,
            "referral_completed",
            "Referral completed".to_string(),
            format!("{} was debited for your completed referral", completed.reward_amount),
        ),
    )
    .await;
    notify(
        &state.pool,
        NewNotification::new(
            referrer_id,
            "referral_payout",
            "Referral reward earned".to_string(),
            format!(
                "{} was added to your withdrawable balance",
                completed.reward_amount
            ),
        ),
    )
    .await;

    Ok(Json(ApiResponse::ok(completed.into())))
}

/// POST /api/v1/referrals/{id}/cancel
///
/// Cancels an open or claimed referral request. A claimed request's hold
/// is released; nothing is debited.
async fn cancel_referral(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReferralActionRequest>,
) -> Result<Json<ApiResponse<ReferralRecord>>, AppError> {
    // Step 1: Load and authorize
    let referral = load_referral(&state.pool, id).await?;
    if referral.seeker_id != request.user_id {
        return Err(AppError::Authorization(
            "Only the seeker can cancel a referral request".to_string(),
        ));
    }

    // Step 2: Cancel and release atomically
    let mut tx = state.pool.begin().await?;

    let cancelled: Option<ReferralRequest> = sqlx::query_as(
        r#"
        UPDATE referral_requests
        SET status = 'cancelled', updated_at = NOW()
        WHERE id = $1 AND status IN ('open', 'claimed')
        RETURNING id, seeker_id, referrer_id, reward_amount, job_title, company, status, hold_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let cancelled = cancelled.ok_or_else(|| {
        AppError::Validation("Referral request is already completed or cancelled".to_string())
    })?;

    if let Some(hold_id) = cancelled.hold_id {
        wallet_ops::release_hold_in_tx(&mut tx, cancelled.seeker_id, hold_id).await?;
    }

    tx.commit().await?;

    // Step 3: Notify the referrer, if one had claimed
    if let Some(referrer_id) = cancelled.referrer_id {
        notify(
            &state.pool,
            NewNotification::new(
                referrer_id,
                "referral_cancelled",
                "Referral request cancelled".to_string(),
                format!(
                    "The referral request for {} at {} was cancelled",
                    cancelled.job_title, cancelled.company
                ),
            ),
        )
        .await;
    }

    Ok(Json(ApiResponse::ok(cancelled.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reward_amount_bounds() {
        assert!(validate_reward_amount(&BigDecimal::from_str("50.00").unwrap()).is_ok());
        assert!(validate_reward_amount(&BigDecimal::from_str("100000.00").unwrap()).is_ok());
        assert!(validate_reward_amount(&BigDecimal::from_str("49.99").unwrap()).is_err());
        assert!(validate_reward_amount(&BigDecimal::from_str("100000.01").unwrap()).is_err());
    }

    #[test]
    fn test_validate_text_field() {
        assert!(validate_text_field("Backend Engineer", "Job title").is_ok());
        assert!(validate_text_field("", "Job title").is_err());
        assert!(validate_text_field("   ", "Job title").is_err());
        assert!(validate_text_field(&"x".repeat(201), "Job title").is_err());
    }

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{
            "userId": "550e8400-e29b-41d4-a716-446655440000",
            "rewardAmount": "400.00",
            "jobTitle": "Backend Engineer",
            "company": "Acme Corp"
        }"#;

        let request: CreateReferralRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.reward_amount, "400.00");
        assert_eq!(request.company, "Acme Corp");
    }

    #[test]
    fn test_referral_record_omits_null_fields() {
        let record = ReferralRecord {
            id: Uuid::new_v4(),
            seeker_id: Uuid::new_v4(),
            referrer_id: None,
            reward_amount: "400.00".to_string(),
            job_title: "Backend Engineer".to_string(),
            company: "Acme Corp".to_string(),
            status: ReferralStatus::Open,
            hold_id: None,
            created_at: "2026-08-01T12:00:00+00:00".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("referrerId"));
        assert!(!json.contains("holdId"));
        assert!(json.contains("\"status\":\"open\""));
    }
}
