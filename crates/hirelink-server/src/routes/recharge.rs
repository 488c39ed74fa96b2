//! Wallet recharge endpoints: gateway order creation and payment
//! verification.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use hirelink_gateway::{client::generate_receipt_id, verify_payment_signature, NewOrderRequest, PaymentConfirmation};

use crate::error::AppError;
use crate::models::{
    NewNotification, NewRechargeOrder, RechargeOrder, RechargeStatus, TransactionSource,
};
use crate::notify::notify;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::wallet_ops;

/// Minimum recharge amount.
const MIN_RECHARGE_AMOUNT: &str = "10.00";

/// Maximum recharge amount per order.
const MAX_RECHARGE_AMOUNT: &str = "100000.00";

/// Wallet currency. The platform runs single-currency wallets.
const CURRENCY: &str = "INR";

/// Request body for creating a recharge order.
/// Note: In production, the user id would come from authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    /// Amount to add to the wallet.
    pub amount: String,
}

/// Response for a created recharge order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Our order identifier.
    pub order_id: Uuid,
    /// The gateway order identifier the checkout flow needs.
    pub gateway_order_id: String,
    pub amount: String,
    pub currency: String,
    pub status: RechargeStatus,
}

/// Request body for verifying a payment confirmation. Field names match
/// the gateway's checkout callback payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub user_id: Uuid,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Response for a verified payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub order_id: Uuid,
    pub amount: String,
    /// False when this confirmation had already been processed.
    pub credited: bool,
}

/// Creates the recharge router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify_payment))
        .with_state(state)
}

/// Validates the recharge amount is within acceptable bounds.
fn validate_recharge_amount(amount: &BigDecimal) -> Result<(), AppError> {
    let min = BigDecimal::from_str(MIN_RECHARGE_AMOUNT).unwrap();
    let max = BigDecimal::from_str(MAX_RECHARGE_AMOUNT).unwrap();

    if amount < &min {
        return Err(AppError::Validation(format!(
            "Minimum recharge amount is {}",
            MIN_RECHARGE_AMOUNT
        )));
    }

    if amount > &max {
        return Err(AppError::Validation(format!(
            "Maximum recharge amount is {}",
            MAX_RECHARGE_AMOUNT
        )));
    }

    Ok(())
}

/// Converts an amount to the gateway's minor currency units (paise).
fn to_minor_units(amount: &BigDecimal) -> Result<i64, AppError> {
    let minor = amount * BigDecimal::from(100);
    if !minor.is_integer() {
        return Err(AppError::Validation(
            "Amount cannot have more than two decimal places".to_string(),
        ));
    }

    minor
        .to_i64()
        .ok_or_else(|| AppError::Validation("Amount out of range".to_string()))
}

/// POST /api/v1/wallet/recharge/create-order
///
/// Creates an order with the payment gateway and records it pending
/// payment. The wallet is not credited until the confirmation verifies.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<CreateOrderResponse>>, AppError> {
    // Step 1: Parse and validate amount
    let amount = BigDecimal::from_str(&request.amount)
        .map_err(|e| AppError::Validation(format!("Invalid amount format: {}", e)))?;
    validate_recharge_amount(&amount)?;

    // Step 2: Create the order with the gateway
    let gateway_request = NewOrderRequest {
        amount: to_minor_units(&amount)?,
        currency: CURRENCY.to_string(),
        receipt: generate_receipt_id(),
    };

    let gateway_order = state
        .gateway
        .create_order(&gateway_request)
        .await
        .map_err(|e| AppError::Internal(format!("Gateway order creation failed: {}", e)))?;

    // Step 3: Record the order pending payment
    let new_order = NewRechargeOrder {
        user_id: request.user_id,
        amount: amount.clone(),
        gateway_order_id: gateway_order.id,
    };

    let order: RechargeOrder = sqlx::query_as(
        r#"
        INSERT INTO recharge_orders (user_id, amount, gateway_order_id, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, amount, gateway_order_id, gateway_payment_id, status, created_at, updated_at
        "#,
    )
    .bind(new_order.user_id)
    .bind(&new_order.amount)
    .bind(&new_order.gateway_order_id)
    .bind(RechargeStatus::Created)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::ok(CreateOrderResponse {
        order_id: order.id,
        gateway_order_id: order.gateway_order_id,
        amount: order.amount.to_string(),
        currency: CURRENCY.to_string(),
        status: order.status,
    })))
}

/// Loads a recharge order by its gateway order id.
async fn load_order_by_gateway_id(
    pool: &sqlx::PgPool,
    gateway_order_id: &str,
) -> Result<RechargeOrder, AppError> {
    let order: Option<RechargeOrder> = sqlx::query_as(
        r#"
        SELECT id, user_id, amount, gateway_order_id, gateway_payment_id, status, created_at, updated_at
        FROM recharge_orders
        WHERE gateway_order_id = $1
        "#,
    )
    .bind(gateway_order_id)
    .fetch_optional(pool)
    .await?;

    order.ok_or_else(|| AppError::NotFound(format!("Recharge order not found: {}", gateway_order_id)))
}

/// POST /api/v1/wallet/recharge/verify
///
/// Verifies a payment confirmation and credits the wallet exactly once.
///
/// The credit is tied to the order's `created -> paid` transition, guarded
/// in the UPDATE's WHERE clause, and the gateway payment id is unique.
/// Replaying a confirmation finds the order already paid and returns
/// success without crediting again.
async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<ApiResponse<VerifyPaymentResponse>>, AppError> {
    // Step 1: Verify the gateway signature before trusting anything else
    let confirmation = PaymentConfirmation {
        razorpay_order_id: request.razorpay_order_id.clone(),
        razorpay_payment_id: request.razorpay_payment_id.clone(),
        razorpay_signature: request.razorpay_signature.clone(),
    };

    verify_payment_signature(&confirmation, state.gateway.key_secret())
        .map_err(|_| AppError::Validation("Payment signature verification failed".to_string()))?;

    // Step 2: Load the order and check ownership
    let order = load_order_by_gateway_id(&state.pool, &request.razorpay_order_id).await?;
    if order.user_id != request.user_id {
        return Err(AppError::Authorization(
            "Recharge order belongs to a different user".to_string(),
        ));
    }

    // Step 3: Transition created -> paid and credit, atomically
    let mut tx = state.pool.begin().await?;

    let transitioned: Option<RechargeOrder> = sqlx::query_as(
        r#"
        UPDATE recharge_orders
        SET status = 'paid', gateway_payment_id = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'created'
        RETURNING id, user_id, amount, gateway_order_id, gateway_payment_id, status, created_at, updated_at
        "#,
    )
    .bind(order.id)
    .bind(&request.razorpay_payment_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(paid_order) = transitioned else {
        // No transition happened; decide between a replay and a dead order.
        drop(tx);
        return verify_replay_outcome(&order, &request.razorpay_payment_id);
    };

    wallet_ops::credit_wallet_in_tx(
        &mut tx,
        paid_order.user_id,
        &paid_order.amount,
        TransactionSource::Recharge,
        format!("Wallet recharge via payment {}", request.razorpay_payment_id),
    )
    .await?;

    tx.commit().await?;

    // Step 4: Fire-and-forget notification after the credit committed
    notify(
        &state.pool,
        NewNotification::new(
            paid_order.user_id,
            "wallet_credited",
            "Wallet recharged".to_string(),
            format!("{} added to your wallet", paid_order.amount),
        ),
    )
    .await;

    Ok(Json(ApiResponse::ok(VerifyPaymentResponse {
        order_id: paid_order.id,
        amount: paid_order.amount.to_string(),
        credited: true,
    })))
}

/// Resolves a verification request that found no created-state order: a
/// replay of an already-verified payment succeeds without a credit; any
/// other state is an error.
fn verify_replay_outcome(
    order: &RechargeOrder,
    payment_id: &str,
) -> Result<Json<ApiResponse<VerifyPaymentResponse>>, AppError> {
    if order.is_paid() && order.gateway_payment_id.as_deref() == Some(payment_id) {
        return Ok(Json(ApiResponse::with_message(
            VerifyPaymentResponse {
                order_id: order.id,
                amount: order.amount.to_string(),
                credited: false,
            },
            "Payment already verified",
        )));
    }

    Err(AppError::Validation(format!(
        "Recharge order {} is not awaiting payment",
        order.id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_validate_recharge_amount_bounds() {
        assert!(validate_recharge_amount(&BigDecimal::from_str("10.00").unwrap()).is_ok());
        assert!(validate_recharge_amount(&BigDecimal::from_str("100000.00").unwrap()).is_ok());
        assert!(validate_recharge_amount(&BigDecimal::from_str("9.99").unwrap()).is_err());
        assert!(validate_recharge_amount(&BigDecimal::from_str("100000.01").unwrap()).is_err());
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(
            to_minor_units(&BigDecimal::from_str("500.00").unwrap()).unwrap(),
            50000
        );
        assert_eq!(
            to_minor_units(&BigDecimal::from_str("10.5").unwrap()).unwrap(),
            1050
        );
    }

    #[test]
    fn test_to_minor_units_rejects_sub_paise() {
        assert!(to_minor_units(&BigDecimal::from_str("10.005").unwrap()).is_err());
    }

    #[test]
    fn test_verify_request_deserialization() {
        let json = r#"{
            "userId": "550e8400-e29b-41d4-a716-446655440000",
            "razorpayOrderId": "order_MkWvmPxz1azGQs",
            "razorpayPaymentId": "pay_MkWw7Qf3bzXhEJ",
            "razorpaySignature": "deadbeef"
        }"#;

        let request: VerifyPaymentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.razorpay_order_id, "order_MkWvmPxz1azGQs");
        assert_eq!(request.razorpay_payment_id, "pay_MkWw7Qf3bzXhEJ");
    }

    fn test_order(status: RechargeStatus, payment_id: Option<&str>) -> RechargeOrder {
        let now = Utc::now();
        RechargeOrder {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: BigDecimal::from_str("500.00").unwrap(),
            gateway_order_id: "order_MkWvmPxz1azGQs".to_string(),
            gateway_payment_id: payment_id.map(|p| p.to_string()),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_replay_of_paid_order_is_idempotent_success() {
        let order = test_order(RechargeStatus::Paid, Some("pay_MkWw7Qf3bzXhEJ"));
        let result = verify_replay_outcome(&order, "pay_MkWw7Qf3bzXhEJ").unwrap();
        let envelope = result.0;

        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert!(!data.credited);
    }

    #[test]
    fn test_replay_with_different_payment_id_fails() {
        let order = test_order(RechargeStatus::Paid, Some("pay_MkWw7Qf3bzXhEJ"));
        assert!(verify_replay_outcome(&order, "pay_OTHER").is_err());
    }

    #[test]
    fn test_failed_order_cannot_be_verified() {
        let order = test_order(RechargeStatus::Failed, None);
        assert!(verify_replay_outcome(&order, "pay_MkWw7Qf3bzXhEJ").is_err());
    }
}
