//! Account data routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::user::UserSummary;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::validation::validate_amount;

/// Direct balance overwrite.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    /// Balance to store.
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_amount"))]
    pub new_balance: Decimal,
}

/// Balance after a mutation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Current balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
}

/// Creates the user router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(user_data))
        .route("/user/balance", patch(update_balance))
}

/// GET /user - Email, balance and transactions of the caller.
async fn user_data(AuthUser(ctx): AuthUser) -> Json<UserSummary> {
    Json(ctx.user.summary())
}

/// PATCH /user/balance - Overwrite the balance.
async fn update_balance(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ValidatedJson(payload): ValidatedJson<BalanceRequest>,
) -> ApiResult<Json<BalanceResponse>> {
    let mut user = ctx.user;
    let new_balance = state.ledger.set_balance(&mut user, payload.new_balance).await?;
    Ok(Json(BalanceResponse { new_balance }))
}
