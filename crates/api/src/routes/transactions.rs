//! Ledger and statistics routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::category::{Category, TransactionKind, expense_categories, income_categories};
use tally_core::ledger::{NewTransaction, TransactionResult};
use tally_core::stats::{KindStats, PeriodBreakdown, StatsService, YearMonth};
use tally_shared::types::TransactionId;
use validator::Validate;

use super::user::BalanceResponse;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ValidatedJson, ValidatedQuery};
use crate::middleware::auth::AuthUser;
use crate::validation::{
    parse_date, validate_amount, validate_date, validate_expense_category,
    validate_income_category, validate_period,
};

// ============================================================================
// Request Types
// ============================================================================

/// Request body for recording an income.
#[derive(Debug, Deserialize, Validate)]
pub struct IncomeRequest {
    /// Description.
    #[validate(length(min = 1, max = 300))]
    pub description: String,
    /// Positive amount.
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    /// Calendar day (YYYY-MM-DD).
    #[validate(custom(function = "validate_date"))]
    pub date: String,
    /// Income category.
    #[validate(custom(function = "validate_income_category"))]
    pub category: Category,
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct ExpenseRequest {
    /// Description.
    #[validate(length(min = 1, max = 100))]
    pub description: String,
    /// Positive amount.
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    /// Calendar day (YYYY-MM-DD).
    #[validate(custom(function = "validate_date"))]
    pub date: String,
    /// Expense category.
    #[validate(custom(function = "validate_expense_category"))]
    pub category: Category,
}

/// Query for the period breakdown.
#[derive(Debug, Deserialize, Validate)]
pub struct PeriodQuery {
    /// Month (YYYY-MM).
    #[validate(custom(function = "validate_period"))]
    pub date: String,
}

fn new_transaction(
    description: String,
    amount: Decimal,
    date: &str,
    category: Category,
) -> ApiResult<NewTransaction> {
    let date = parse_date(date)
        .ok_or_else(|| ApiError::validation("date: Invalid date. Use format YYYY-MM-DD"))?;
    Ok(NewTransaction {
        description: Some(description),
        amount,
        date,
        category,
    })
}

/// Creates the transaction router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transaction/income", post(add_income))
        .route("/transaction/expense", post(add_expense))
        .route("/transaction/{transaction_id}", delete(delete_transaction))
        .route("/transaction/income-stats", get(income_stats))
        .route("/transaction/expense-stats", get(expense_stats))
        .route("/transaction/period-data", get(period_data))
        .route("/transaction/income-categories", get(list_income_categories))
        .route("/transaction/expense-categories", get(list_expense_categories))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transaction/income - Record an income.
async fn add_income(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(req): ValidatedJson<IncomeRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResult>)> {
    let input = new_transaction(req.description, req.amount, &req.date, req.category)?;
    let mut user = ctx.user;
    let result = state
        .ledger
        .add_transaction(&mut user, input, TransactionKind::Income)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /transaction/expense - Record an expense.
async fn add_expense(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(req): ValidatedJson<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResult>)> {
    let input = new_transaction(req.description, req.amount, &req.date, req.category)?;
    let mut user = ctx.user;
    let result = state
        .ledger
        .add_transaction(&mut user, input, TransactionKind::Expense)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// DELETE `/transaction/{transaction_id}` - Delete a transaction and reverse it.
async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(transaction_id): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let id: TransactionId = transaction_id
        .parse()
        .map_err(|_| ApiError::validation("transactionId: Invalid id"))?;

    let mut user = ctx.user;
    let new_balance = state.ledger.delete_transaction(&mut user, id).await?;
    Ok(Json(BalanceResponse { new_balance }))
}

/// GET /transaction/income-stats - Incomes and monthly totals of the current year.
async fn income_stats(State(state): State<AppState>, AuthUser(ctx): AuthUser) -> Json<KindStats> {
    let year = state.clock.now().year();
    Json(StatsService::stats_for_kind(
        &ctx.user,
        TransactionKind::Income,
        year,
    ))
}

/// GET /transaction/expense-stats - Expenses and monthly totals of the current year.
async fn expense_stats(State(state): State<AppState>, AuthUser(ctx): AuthUser) -> Json<KindStats> {
    let year = state.clock.now().year();
    Json(StatsService::stats_for_kind(
        &ctx.user,
        TransactionKind::Expense,
        year,
    ))
}

/// GET /transaction/period-data?date=YYYY-MM - Category/description totals of a month.
async fn period_data(
    AuthUser(ctx): AuthUser,
    ValidatedQuery(query): ValidatedQuery<PeriodQuery>,
) -> ApiResult<Json<PeriodBreakdown>> {
    let period: YearMonth = query
        .date
        .parse()
        .map_err(|e: tally_core::stats::InvalidPeriod| ApiError::validation(e.to_string()))?;
    Ok(Json(StatsService::period_breakdown(&ctx.user, period)))
}

/// GET /transaction/income-categories
async fn list_income_categories() -> Json<Vec<Category>> {
    Json(income_categories())
}

/// GET /transaction/expense-categories
async fn list_expense_categories() -> Json<Vec<Category>> {
    Json(expense_categories())
}
