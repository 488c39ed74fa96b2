//! Wallet operations: the transactional core of the service.
//!
//! Every balance-mutating sequence runs inside a database transaction that
//! first locks the wallet row with `SELECT ... FOR UPDATE`, so writers
//! against the same wallet serialize. Two concurrent hold creations that
//! would together over-commit the balance cannot both pass the
//! availability check; the second blocks on the row lock and sees the
//! state the first committed. CHECK constraints on the wallets table back
//! the non-negativity invariant as a final guard.
//!
//! Each operation has a pool-level entry point that owns its transaction,
//! and a `_in_tx` variant for callers that compose several operations
//! atomically (the referral lifecycle converts a hold and credits the
//! referrer in one transaction).

use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    HoldStatus, NewWalletHold, NewWalletTransaction, TransactionSource, TransactionType, Wallet,
    WalletHold, WalletTransaction, WithdrawalRequest, WithdrawalStatus,
};

/// Balance figures for a wallet: stored balance, the sum of active holds,
/// and what remains spendable.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceBreakdown {
    pub balance: BigDecimal,
    pub hold_amount: BigDecimal,
    pub available_balance: BigDecimal,
}

/// Rejects non-positive monetary amounts.
fn ensure_positive(amount: &BigDecimal) -> Result<(), AppError> {
    if amount <= &BigDecimal::from(0) {
        return Err(AppError::Validation("Amount must be positive".to_string()));
    }
    Ok(())
}

/// Returns the wallet for a user, creating one with zero balance if none
/// exists. Idempotent.
pub async fn get_or_create_wallet(pool: &PgPool, user_id: Uuid) -> Result<Wallet, AppError> {
    sqlx::query(
        r#"
        INSERT INTO wallets (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    let wallet: Wallet = sqlx::query_as(
        r#"
        SELECT id, user_id, balance, withdrawable_balance, status, created_at, updated_at
        FROM wallets
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(wallet)
}

/// Locks a user's wallet row for the duration of the transaction, creating
/// the wallet first if it does not exist yet.
async fn lock_wallet(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
) -> Result<Wallet, AppError> {
    sqlx::query(
        r#"
        INSERT INTO wallets (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    let wallet: Wallet = sqlx::query_as(
        r#"
        SELECT id, user_id, balance, withdrawable_balance, status, created_at, updated_at
        FROM wallets
        WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(wallet)
}

/// Locks a wallet row by wallet id. Used by hold resolution, where the
/// caller starts from the hold rather than the user.
async fn lock_wallet_by_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    wallet_id: Uuid,
) -> Result<Wallet, AppError> {
    let wallet: Wallet = sqlx::query_as(
        r#"
        SELECT id, user_id, balance, withdrawable_balance, status, created_at, updated_at
        FROM wallets
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(wallet_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(wallet)
}

/// Sum of active holds for a wallet, inside the caller's transaction.
async fn locked_hold_amount(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    wallet_id: Uuid,
) -> Result<BigDecimal, AppError> {
    let total: Option<BigDecimal> = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM wallet_holds
        WHERE wallet_id = $1 AND status = 'active'
        "#,
    )
    .bind(wallet_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
}

/// Inserts a ledger entry inside the caller's transaction. The only write
/// path into wallet_transactions; there is no update or delete path.
async fn insert_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &NewWalletTransaction,
) -> Result<WalletTransaction, AppError> {
    let recorded: WalletTransaction = sqlx::query_as(
        r#"
        INSERT INTO wallet_transactions (wallet_id, tx_type, amount, source, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, wallet_id, tx_type, amount, source, description, created_at
        "#,
    )
    .bind(entry.wallet_id)
    .bind(entry.tx_type)
    .bind(&entry.amount)
    .bind(entry.source)
    .bind(&entry.description)
    .fetch_one(&mut **tx)
    .await?;

    Ok(recorded)
}

/// Decrements a wallet's balance inside the caller's transaction.
///
/// The withdrawable balance is clamped to the new balance so the
/// withdrawable-within-balance constraint holds when a debit eats into
/// referral earnings.
async fn apply_debit(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    wallet_id: Uuid,
    amount: &BigDecimal,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE wallets
        SET balance = balance - $2,
            withdrawable_balance = LEAST(withdrawable_balance, balance - $2),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(wallet_id)
    .bind(amount)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Returns the balance breakdown for a user's wallet.
pub async fn get_balance_breakdown(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<BalanceBreakdown, AppError> {
    let wallet = get_or_create_wallet(pool, user_id).await?;

    let hold_amount: Option<BigDecimal> = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM wallet_holds
        WHERE wallet_id = $1 AND status = 'active'
        "#,
    )
    .bind(wallet.id)
    .fetch_one(pool)
    .await?;
    let hold_amount = hold_amount.unwrap_or_else(|| BigDecimal::from(0));

    let available_balance = wallet.available_balance(&hold_amount);

    Ok(BalanceBreakdown {
        balance: wallet.balance,
        hold_amount,
        available_balance,
    })
}

/// Creates a hold inside the caller's transaction.
///
/// Fails with `InsufficientBalance` if the available balance (balance
/// minus active holds) cannot cover the amount at creation time.
pub(crate) async fn create_hold_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    amount: &BigDecimal,
    referral_request_id: Uuid,
) -> Result<WalletHold, AppError> {
    ensure_positive(amount)?;

    let wallet = lock_wallet(tx, user_id).await?;
    if !wallet.is_active() {
        return Err(AppError::Validation("Wallet is suspended".to_string()));
    }

    let hold_amount = locked_hold_amount(tx, wallet.id).await?;
    if !wallet.has_available(&hold_amount, amount) {
        return Err(AppError::InsufficientBalance(format!(
            "Available balance {} cannot cover hold of {}",
            wallet.available_balance(&hold_amount),
            amount
        )));
    }

    let new_hold = NewWalletHold::new(wallet.id, amount.clone(), referral_request_id);
    let hold: WalletHold = sqlx::query_as(
        r#"
        INSERT INTO wallet_holds (wallet_id, amount, referral_request_id)
        VALUES ($1, $2, $3)
        RETURNING id, wallet_id, amount, status, referral_request_id, created_at, resolved_at
        "#,
    )
    .bind(new_hold.wallet_id)
    .bind(&new_hold.amount)
    .bind(new_hold.referral_request_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(hold)
}

/// Creates a hold against a user's wallet for a claimed referral request.
pub async fn create_hold(
    pool: &PgPool,
    user_id: Uuid,
    amount: &BigDecimal,
    referral_request_id: Uuid,
) -> Result<WalletHold, AppError> {
    let mut tx = pool.begin().await?;
    let hold = create_hold_in_tx(&mut tx, user_id, amount, referral_request_id).await?;
    tx.commit().await?;
    Ok(hold)
}

/// Loads a hold and locks its wallet, checking the wallet belongs to the
/// caller. Shared by conversion and release.
async fn lock_hold_wallet(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    hold_id: Uuid,
) -> Result<(WalletHold, Wallet), AppError> {
    let hold: Option<WalletHold> = sqlx::query_as(
        r#"
        SELECT id, wallet_id, amount, status, referral_request_id, created_at, resolved_at
        FROM wallet_holds
        WHERE id = $1
        "#,
    )
    .bind(hold_id)
    .fetch_optional(&mut **tx)
    .await?;

    let hold = hold.ok_or_else(|| AppError::NotFound(format!("Hold not found: {}", hold_id)))?;

    let wallet = lock_wallet_by_id(tx, hold.wallet_id).await?;
    if wallet.user_id != user_id {
        return Err(AppError::Authorization(
            "Hold belongs to a different wallet".to_string(),
        ));
    }

    Ok((hold, wallet))
}

/// Transitions a hold out of Active, stamping `resolved_at`. Returns the
/// updated hold, or `InvalidHoldState` if the hold was already terminal.
///
/// The guard lives in the WHERE clause, so a hold can only ever leave
/// Active once.
async fn transition_hold(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    hold_id: Uuid,
    to_status: HoldStatus,
) -> Result<WalletHold, AppError> {
    let updated: Option<WalletHold> = sqlx::query_as(
        r#"
        UPDATE wallet_holds
        SET status = $2, resolved_at = NOW()
        WHERE id = $1 AND status = 'active'
        RETURNING id, wallet_id, amount, status, referral_request_id, created_at, resolved_at
        "#,
    )
    .bind(hold_id)
    .bind(to_status)
    .fetch_optional(&mut **tx)
    .await?;

    updated.ok_or_else(|| AppError::InvalidHoldState(format!("Hold {} is not active", hold_id)))
}

/// Converts an active hold into a real debit inside the caller's
/// transaction: the hold becomes Converted, a debit ledger entry is
/// recorded, and the wallet balance drops by the held amount.
pub(crate) async fn convert_hold_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    hold_id: Uuid,
    description: String,
) -> Result<(WalletHold, WalletTransaction), AppError> {
    let (_, wallet) = lock_hold_wallet(tx, user_id, hold_id).await?;
    let hold = transition_hold(tx, hold_id, HoldStatus::Converted).await?;

    let entry = insert_transaction(
        tx,
        &NewWalletTransaction::debit(
            wallet.id,
            hold.amount.clone(),
            TransactionSource::HoldConversion,
            description,
        ),
    )
    .await?;

    apply_debit(tx, wallet.id, &hold.amount).await?;

    Ok((hold, entry))
}

/// Converts an active hold into a real debit.
pub async fn convert_hold(
    pool: &PgPool,
    user_id: Uuid,
    hold_id: Uuid,
    description: String,
) -> Result<(WalletHold, WalletTransaction), AppError> {
    let mut tx = pool.begin().await?;
    let result = convert_hold_in_tx(&mut tx, user_id, hold_id, description).await?;
    tx.commit().await?;
    Ok(result)
}

/// Releases an active hold inside the caller's transaction: the
/// reservation is cancelled, no ledger entry is recorded, and the balance
/// is untouched.
pub(crate) async fn release_hold_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    hold_id: Uuid,
) -> Result<WalletHold, AppError> {
    lock_hold_wallet(tx, user_id, hold_id).await?;
    transition_hold(tx, hold_id, HoldStatus::Released).await
}

/// Releases an active hold.
pub async fn release_hold(
    pool: &PgPool,
    user_id: Uuid,
    hold_id: Uuid,
) -> Result<WalletHold, AppError> {
    let mut tx = pool.begin().await?;
    let hold = release_hold_in_tx(&mut tx, user_id, hold_id).await?;
    tx.commit().await?;
    Ok(hold)
}

/// Credits a wallet inside the caller's transaction. Referral payouts also
/// raise the withdrawable balance.
pub(crate) async fn credit_wallet_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    amount: &BigDecimal,
    source: TransactionSource,
    description: String,
) -> Result<WalletTransaction, AppError> {
    ensure_positive(amount)?;

    let wallet = lock_wallet(tx, user_id).await?;

    let entry = insert_transaction(
        tx,
        &NewWalletTransaction::credit(wallet.id, amount.clone(), source, description),
    )
    .await?;

    if source == TransactionSource::ReferralPayout {
        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $2,
                withdrawable_balance = withdrawable_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(wallet.id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;
    } else {
        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(wallet.id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(entry)
}

/// Credits a wallet: inserts a credit ledger entry and raises the balance.
pub async fn credit_wallet(
    pool: &PgPool,
    user_id: Uuid,
    amount: &BigDecimal,
    source: TransactionSource,
    description: String,
) -> Result<WalletTransaction, AppError> {
    let mut tx = pool.begin().await?;
    let entry = credit_wallet_in_tx(&mut tx, user_id, amount, source, description).await?;
    tx.commit().await?;
    Ok(entry)
}

/// Debits a wallet: validates the available balance covers the amount,
/// inserts a debit ledger entry, and lowers the balance. A rejected debit
/// leaves the wallet untouched.
pub async fn debit_wallet(
    pool: &PgPool,
    user_id: Uuid,
    amount: &BigDecimal,
    source: TransactionSource,
    description: String,
) -> Result<WalletTransaction, AppError> {
    ensure_positive(amount)?;

    let mut tx = pool.begin().await?;

    let wallet = lock_wallet(&mut tx, user_id).await?;
    if !wallet.is_active() {
        return Err(AppError::Validation("Wallet is suspended".to_string()));
    }

    let hold_amount = locked_hold_amount(&mut tx, wallet.id).await?;
    if !wallet.has_available(&hold_amount, amount) {
        return Err(AppError::InsufficientBalance(format!(
            "Available balance {} cannot cover debit of {}",
            wallet.available_balance(&hold_amount),
            amount
        )));
    }

    let entry = insert_transaction(
        &mut tx,
        &NewWalletTransaction::debit(wallet.id, amount.clone(), source, description),
    )
    .await?;

    apply_debit(&mut tx, wallet.id, amount).await?;

    tx.commit().await?;

    Ok(entry)
}

/// Creates a pending withdrawal request against the withdrawable balance,
/// moving the amount out of both balances and recording the debit.
pub async fn request_withdrawal(
    pool: &PgPool,
    user_id: Uuid,
    amount: &BigDecimal,
    payout_details: serde_json::Value,
) -> Result<WithdrawalRequest, AppError> {
    ensure_positive(amount)?;

    let mut tx = pool.begin().await?;

    let wallet = lock_wallet(&mut tx, user_id).await?;
    if !wallet.is_active() {
        return Err(AppError::Validation("Wallet is suspended".to_string()));
    }

    if &wallet.withdrawable_balance < amount {
        return Err(AppError::InsufficientBalance(format!(
            "Withdrawable balance {} cannot cover withdrawal of {}",
            wallet.withdrawable_balance, amount
        )));
    }

    insert_transaction(
        &mut tx,
        &NewWalletTransaction::debit(
            wallet.id,
            amount.clone(),
            TransactionSource::Withdrawal,
            "Withdrawal request".to_string(),
        ),
    )
    .await?;

    sqlx::query(
        r#"
        UPDATE wallets
        SET balance = balance - $2,
            withdrawable_balance = withdrawable_balance - $2,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(wallet.id)
    .bind(amount)
    .execute(&mut *tx)
    .await?;

    let request: WithdrawalRequest = sqlx::query_as(
        r#"
        INSERT INTO withdrawal_requests (user_id, amount, payout_details, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, amount, payout_details, status, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(&payout_details)
    .bind(WithdrawalStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(request)
}

/// Paginated, reverse-chronological ledger history for a user's wallet.
pub async fn get_transaction_history(
    pool: &PgPool,
    user_id: Uuid,
    page: i64,
    page_size: i64,
    type_filter: Option<TransactionType>,
) -> Result<Vec<WalletTransaction>, AppError> {
    let wallet = get_or_create_wallet(pool, user_id).await?;
    let offset = (page - 1) * page_size;

    let entries: Vec<WalletTransaction> = match type_filter {
        Some(tx_type) => {
            sqlx::query_as(
                r#"
                SELECT id, wallet_id, tx_type, amount, source, description, created_at
                FROM wallet_transactions
                WHERE wallet_id = $1 AND tx_type = $2
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(wallet.id)
            .bind(tx_type)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, wallet_id, tx_type, amount, source, description, created_at
                FROM wallet_transactions
                WHERE wallet_id = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(wallet.id)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(entries)
}

/// All holds for a user's wallet, newest first.
pub async fn list_holds(pool: &PgPool, user_id: Uuid) -> Result<Vec<WalletHold>, AppError> {
    let wallet = get_or_create_wallet(pool, user_id).await?;

    let holds: Vec<WalletHold> = sqlx::query_as(
        r#"
        SELECT id, wallet_id, amount, status, referral_request_id, created_at, resolved_at
        FROM wallet_holds
        WHERE wallet_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(wallet.id)
    .fetch_all(pool)
    .await?;

    Ok(holds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(&BigDecimal::from(0)).is_err());
        assert!(ensure_positive(&BigDecimal::from_str("-1.00").unwrap()).is_err());
        assert!(ensure_positive(&BigDecimal::from_str("0.01").unwrap()).is_ok());
    }

    #[test]
    fn test_balance_breakdown_serialization() {
        let breakdown = BalanceBreakdown {
            balance: BigDecimal::from_str("1000.00").unwrap(),
            hold_amount: BigDecimal::from_str("400.00").unwrap(),
            available_balance: BigDecimal::from_str("600.00").unwrap(),
        };

        let json = serde_json::to_value(&breakdown).unwrap();
        assert!(json.get("holdAmount").is_some());
        assert!(json.get("availableBalance").is_some());
    }
}
