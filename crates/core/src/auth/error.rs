//! Authentication error types.

use tally_shared::{AppError, JwtError};
use thiserror::Error;

use super::{PasswordError, SessionTransitionError};
use crate::store::StoreError;

/// Why a bearer token was not honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No bearer token was supplied.
    MissingToken,
    /// The token was revoked by logout.
    TokenBlacklisted,
    /// The token's own expiry has passed.
    TokenExpired,
    /// Bad signature, wrong secret, or malformed token.
    InvalidToken,
    /// The embedded user no longer exists.
    UserNotFound,
    /// The embedded session no longer exists.
    SessionNotFound,
}

impl AccessDenied {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn reason_code(self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::TokenBlacklisted => "token_blacklisted",
            Self::TokenExpired => "token_expired",
            Self::InvalidToken => "invalid_token",
            Self::UserNotFound => "user_not_found",
            Self::SessionNotFound => "session_not_found",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "No token provided",
            Self::TokenBlacklisted => "Token has been revoked",
            Self::TokenExpired => "Token has expired",
            Self::InvalidToken => "Invalid token",
            Self::UserNotFound => "Invalid user",
            Self::SessionNotFound => "Invalid session",
        }
    }
}

impl From<JwtError> for AccessDenied {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::Invalid | JwtError::EncodingError(_) => Self::InvalidToken,
        }
    }
}

/// Errors raised by identity and session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A bearer token was rejected.
    #[error("{}", .0.message())]
    AccessDenied(AccessDenied),

    /// Unknown email or wrong password; the two are not distinguished.
    #[error("Email or password is wrong")]
    InvalidCredentials,

    /// Registration with an email that already exists.
    #[error("Email {0} is already in use")]
    EmailTaken(String),

    /// Refresh named a session that does not exist.
    #[error("Session not found")]
    SessionNotFound,

    /// Refresh token referenced a user that does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Logout found no session row to delete.
    #[error("Nothing to log out")]
    NothingToLogOut,

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Signing(JwtError),

    /// Storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Session lifecycle violated.
    #[error(transparent)]
    Transition(#[from] SessionTransitionError),
}

impl AuthError {
    /// Machine-readable reason code, when the error is an authentication
    /// failure.
    #[must_use]
    pub const fn reason_code(&self) -> Option<&'static str> {
        match self {
            Self::AccessDenied(reason) => Some(reason.reason_code()),
            Self::InvalidCredentials => Some("invalid_credentials"),
            _ => None,
        }
    }
}

impl From<AccessDenied> for AuthError {
    fn from(reason: AccessDenied) -> Self {
        Self::AccessDenied(reason)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AccessDenied(_) | AuthError::InvalidCredentials => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::EmailTaken(_) => Self::Conflict(err.to_string()),
            AuthError::SessionNotFound | AuthError::UserNotFound | AuthError::NothingToLogOut => {
                Self::NotFound(err.to_string())
            }
            AuthError::Store(e) => e.into(),
            AuthError::Password(_) | AuthError::Signing(_) | AuthError::Transition(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
