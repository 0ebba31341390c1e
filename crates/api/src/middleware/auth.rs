//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tally_core::auth::{AccessDenied, AuthError, Session};
use tally_core::user::User;

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Identity attached to a request by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Token owner, as loaded for this request.
    pub user: User,
    /// Session backing the token.
    pub session: Session,
    /// The raw access token, needed to blacklist it on logout.
    pub token: String,
}

/// Authentication middleware that resolves the bearer token.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Rejects blacklisted, expired or forged tokens
/// 3. Loads the user and session the token names
/// 4. Stores them in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_string) else {
        return ApiError::from(AuthError::from(AccessDenied::MissingToken)).into_response();
    };

    match state.sessions.verify_access(&token).await {
        Ok(auth) => {
            request.extensions_mut().insert(AuthContext {
                user: auth.user,
                session: auth.session,
                token,
            });
            next.run(request).await
        }
        Err(e) => {
            if let Some(reason) = e.reason_code() {
                tracing::debug!(reason, "access token rejected");
            }
            ApiError::from(e).into_response()
        }
    }
}

/// Extractor for the authenticated request context.
///
/// Use this in handlers behind [`auth_middleware`]:
///
/// ```ignore
/// async fn handler(AuthUser(ctx): AuthUser) -> impl IntoResponse {
///     let balance = ctx.user.balance;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::from(AccessDenied::MissingToken).into())
    }
}
