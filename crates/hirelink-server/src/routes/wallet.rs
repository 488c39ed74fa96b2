//! Wallet endpoints: balances, ledger history, holds, debits, and
//! withdrawals.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    HoldStatus, NewNotification, TransactionSource, TransactionType, Wallet, WalletStatus,
    WithdrawalStatus,
};
use crate::notify::notify;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::wallet_ops;

/// Default page size for transaction history.
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on transaction history page size.
const MAX_PAGE_SIZE: i64 = 100;

/// Query string carrying the acting user.
/// Note: In production, the user id would come from authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Wallet record as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    /// The wallet identifier.
    pub wallet_id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Stored balance.
    pub balance: String,
    /// Referral-earned balance eligible for payout.
    pub withdrawable_balance: String,
    /// Wallet status.
    pub status: WalletStatus,
    /// When the wallet was created.
    pub created_at: String,
}

impl From<Wallet> for WalletRecord {
    fn from(wallet: Wallet) -> Self {
        Self {
            wallet_id: wallet.id,
            user_id: wallet.user_id,
            balance: wallet.balance.to_string(),
            withdrawable_balance: wallet.withdrawable_balance.to_string(),
            status: wallet.status,
            created_at: wallet.created_at.to_rfc3339(),
        }
    }
}

/// Response for the balance endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Stored wallet balance.
    pub balance: String,
    /// Sum of currently active holds.
    pub hold_amount: String,
    /// Spendable amount: balance minus active holds.
    pub available_balance: String,
}

/// Query parameters for transaction history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    /// Optional credit/debit filter.
    #[serde(default, rename = "type")]
    pub tx_type: Option<TransactionType>,
}

/// A ledger entry as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: String,
    pub source: TransactionSource,
    pub description: String,
    pub created_at: String,
}

/// Response for transaction history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub page: i64,
    pub page_size: i64,
    pub transactions: Vec<TransactionRecord>,
}

/// Request body for a generic wallet debit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitRequest {
    pub user_id: Uuid,
    pub amount: String,
    /// Defaults to a manual adjustment when omitted.
    #[serde(default)]
    pub source: Option<TransactionSource>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response for a successful debit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitResponse {
    pub transaction_id: Uuid,
    pub amount: String,
    pub new_balance: String,
}

/// A hold as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRecord {
    pub id: Uuid,
    pub amount: String,
    pub status: HoldStatus,
    pub referral_request_id: Uuid,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

/// Response for the withdrawable balance endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawableResponse {
    pub withdrawable_balance: String,
}

/// Request body for creating a withdrawal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub user_id: Uuid,
    pub amount: String,
    /// Destination account details (bank/UPI).
    pub payout_details: serde_json::Value,
}

/// Response for a created withdrawal request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub withdrawal_id: Uuid,
    pub amount: String,
    pub status: WithdrawalStatus,
}

/// Creates the wallet router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_wallet))
        .route("/balance", get(get_balance))
        .route("/transactions", get(get_transactions))
        .route("/debit", post(debit_wallet))
        .route("/holds", get(get_holds))
        .route("/withdrawable", get(get_withdrawable))
        .route("/withdraw", post(create_withdrawal))
        .with_state(state.clone())
        .nest("/recharge", super::recharge::router(state))
}

/// Parses a decimal amount from its string form.
fn parse_amount(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid amount format: {}", e)))
}

/// Clamps pagination parameters to sane bounds.
fn resolve_paging(page: Option<i64>, page_size: Option<i64>) -> Result<(i64, i64), AppError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("Page must be at least 1".to_string()));
    }

    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size < 1 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "Page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    Ok((page, page_size))
}

/// GET /api/v1/wallet
///
/// Returns the caller's wallet, creating it on first access.
async fn get_wallet(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<WalletRecord>>, AppError> {
    let wallet = wallet_ops::get_or_create_wallet(&state.pool, query.user_id).await?;
    Ok(Json(ApiResponse::ok(wallet.into())))
}

/// GET /api/v1/wallet/balance
///
/// Returns the balance breakdown: stored balance, active hold total, and
/// available balance.
async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<BalanceResponse>>, AppError> {
    let breakdown = wallet_ops::get_balance_breakdown(&state.pool, query.user_id).await?;

    Ok(Json(ApiResponse::ok(BalanceResponse {
        balance: breakdown.balance.to_string(),
        hold_amount: breakdown.hold_amount.to_string(),
        available_balance: breakdown.available_balance.to_string(),
    })))
}

/// GET /api/v1/wallet/transactions
///
/// Returns the wallet's ledger history, newest first, optionally filtered
/// by credit/debit.
async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryResponse>>, AppError> {
    let (page, page_size) = resolve_paging(query.page, query.page_size)?;

    let entries = wallet_ops::get_transaction_history(
        &state.pool,
        query.user_id,
        page,
        page_size,
        query.tx_type,
    )
    .await?;

    let transactions = entries
        .into_iter()
        .map(|entry| TransactionRecord {
            id: entry.id,
            tx_type: entry.tx_type,
            amount: entry.amount.to_string(),
            source: entry.source,
            description: entry.description,
            created_at: entry.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(ApiResponse::ok(HistoryResponse {
        page,
        page_size,
        transactions,
    })))
}

/// POST /api/v1/wallet/debit
///
/// Debits the wallet. Rejected with INSUFFICIENT_BALANCE if the available
/// balance cannot cover the amount.
async fn debit_wallet(
    State(state): State<AppState>,
    Json(request): Json<DebitRequest>,
) -> Result<Json<ApiResponse<DebitResponse>>, AppError> {
    let amount = parse_amount(&request.amount)?;
    let source = request.source.unwrap_or(TransactionSource::Manual);
    let description = request.description.unwrap_or_else(|| "Wallet debit".to_string());

    let entry =
        wallet_ops::debit_wallet(&state.pool, request.user_id, &amount, source, description)
            .await?;

    let breakdown = wallet_ops::get_balance_breakdown(&state.pool, request.user_id).await?;

    notify(
        &state.pool,
        NewNotification::new(
            request.user_id,
            "wallet_debited",
            "Wallet debited".to_string(),
            format!("{} debited from your wallet", entry.amount),
        ),
    )
    .await;

    Ok(Json(ApiResponse::ok(DebitResponse {
        transaction_id: entry.id,
        amount: entry.amount.to_string(),
        new_balance: breakdown.balance.to_string(),
    })))
}

/// GET /api/v1/wallet/holds
///
/// Returns all holds for the caller's wallet, newest first.
async fn get_holds(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<Vec<HoldRecord>>>, AppError> {
    let holds = wallet_ops::list_holds(&state.pool, query.user_id).await?;

    let records = holds
        .into_iter()
        .map(|hold| HoldRecord {
            id: hold.id,
            amount: hold.amount.to_string(),
            status: hold.status,
            referral_request_id: hold.referral_request_id,
            created_at: hold.created_at.to_rfc3339(),
            resolved_at: hold.resolved_at.map(|t| t.to_rfc3339()),
        })
        .collect();

    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/v1/wallet/withdrawable
///
/// Returns the referral-earned balance eligible for payout.
async fn get_withdrawable(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<WithdrawableResponse>>, AppError> {
    let wallet = wallet_ops::get_or_create_wallet(&state.pool, query.user_id).await?;

    Ok(Json(ApiResponse::ok(WithdrawableResponse {
        withdrawable_balance: wallet.withdrawable_balance.to_string(),
    })))
}

/// POST /api/v1/wallet/withdraw
///
/// Creates a pending withdrawal request against the withdrawable balance.
/// The actual payout is handled by an external approval process.
async fn create_withdrawal(
    State(state): State<AppState>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<ApiResponse<WithdrawResponse>>, AppError> {
    let amount = parse_amount(&request.amount)?;

    match request.payout_details.as_object() {
        Some(details) if !details.is_empty() => {}
        _ => {
            return Err(AppError::Validation(
                "Payout details must be a non-empty object".to_string(),
            ));
        }
    }

    let withdrawal = wallet_ops::request_withdrawal(
        &state.pool,
        request.user_id,
        &amount,
        request.payout_details,
    )
    .await?;

    notify(
        &state.pool,
        NewNotification::new(
            request.user_id,
            "withdrawal_requested",
            "Withdrawal requested".to_string(),
            format!("Withdrawal of {} is pending approval", withdrawal.amount),
        ),
    )
    .await;

    Ok(Json(ApiResponse::with_message(
        WithdrawResponse {
            withdrawal_id: withdrawal.id,
            amount: withdrawal.amount.to_string(),
            status: withdrawal.status,
        },
        "Withdrawal request created and pending approval",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(
            parse_amount("100.50").unwrap(),
            BigDecimal::from_str("100.50").unwrap()
        );
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(parse_amount("not-a-number").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_resolve_paging_defaults() {
        let (page, page_size) = resolve_paging(None, None).unwrap();
        assert_eq!(page, 1);
        assert_eq!(page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_resolve_paging_rejects_bad_values() {
        assert!(resolve_paging(Some(0), None).is_err());
        assert!(resolve_paging(None, Some(0)).is_err());
        assert!(resolve_paging(None, Some(MAX_PAGE_SIZE + 1)).is_err());
    }

    #[test]
    fn test_resolve_paging_accepts_bounds() {
        assert!(resolve_paging(Some(1), Some(1)).is_ok());
        assert!(resolve_paging(Some(100), Some(MAX_PAGE_SIZE)).is_ok());
    }

    #[test]
    fn test_history_query_type_filter_deserialization() {
        let query: HistoryQuery =
            serde_json::from_str(r#"{"userId": "550e8400-e29b-41d4-a716-446655440000", "type": "debit"}"#)
                .unwrap();
        assert_eq!(query.tx_type, Some(TransactionType::Debit));
        assert!(query.page.is_none());
    }

    #[test]
    fn test_balance_response_serialization() {
        let response = BalanceResponse {
            balance: "1000.00".to_string(),
            hold_amount: "400.00".to_string(),
            available_balance: "600.00".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"holdAmount\":\"400.00\""));
        assert!(json.contains("\"availableBalance\":\"600.00\""));
    }

    #[test]
    fn test_hold_record_omits_null_resolved_at() {
        let record = HoldRecord {
            id: Uuid::new_v4(),
            amount: "400.00".to_string(),
            status: HoldStatus::Active,
            referral_request_id: Uuid::new_v4(),
            created_at: "2026-08-01T12:00:00+00:00".to_string(),
            resolved_at: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("resolvedAt"));
        assert!(json.contains("\"status\":\"active\""));
    }
}
