//! Authentication routes for register, login, logout, and token refresh.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::ORIGIN},
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::auth::{LoginOutcome, RefreshOutcome, RegisteredUser};
use tally_shared::types::SessionId;
use validator::Validate;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::{AuthUser, bearer_token};
use crate::validation::validate_uuid;

/// Credentials payload for register and login.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    /// Email address.
    #[validate(email(message = "Email must be a valid email"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Refresh payload.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Session the refresh token was issued for.
    #[validate(custom(function = "validate_uuid"))]
    pub sid: String,
}

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Auth routes that need an access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<AuthRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredUser>)> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());

    let registered = state
        .sessions
        .identity()
        .register(&payload.email, &payload.password, origin)
        .await?;

    Ok((StatusCode::CREATED, Json(registered)))
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AuthRequest>,
) -> ApiResult<Json<LoginOutcome>> {
    let outcome = state
        .sessions
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(outcome))
}

/// POST /auth/refresh - Rotate the session behind a refresh token.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshOutcome>> {
    let sid: SessionId = payload
        .sid
        .parse()
        .map_err(|_| ApiError::validation("sid: Invalid id"))?;

    let outcome = state
        .sessions
        .refresh(sid, bearer_token(&headers))
        .await?;
    Ok(Json(outcome))
}

/// POST /auth/logout - Revoke the current access token and session.
async fn logout(State(state): State<AppState>, AuthUser(ctx): AuthUser) -> ApiResult<Json<Value>> {
    state.sessions.logout(&ctx.session, &ctx.token).await?;
    Ok(Json(json!({ "message": "Successfully logged out." })))
}
