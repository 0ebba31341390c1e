//! JWT token generation and validation.
//!
//! Access and refresh tokens are signed with distinct secrets, so a leaked
//! access token can never be replayed against the refresh endpoint.
//!
//! Issuance and expiry are judged against a caller-supplied instant, so the
//! service follows whatever clock the caller runs on.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{Claims, TokenPair};
use crate::types::{SessionId, UserId};

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing access tokens.
    pub access_secret: String,
    /// Secret key for signing refresh tokens.
    pub refresh_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expires_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: "change-me-access-secret".to_string(),
            refresh_secret: "change-me-refresh-secret".to_string(),
            access_token_expires_secs: 900,
            refresh_token_expires_secs: 604_800,
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is malformed or its signature does not match.
    #[error("invalid token")]
    Invalid,
}

/// Signing and verification keys for one token kind.
#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field(
                "access_token_expires_secs",
                &self.config.access_token_expires_secs,
            )
            .field(
                "refresh_token_expires_secs",
                &self.config.refresh_token_expires_secs,
            )
            .field("access_keys", &"[hidden]")
            .field("refresh_keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let access_keys = KeyPair::from_secret(&config.access_secret);
        let refresh_keys = KeyPair::from_secret(&config.refresh_secret);
        Self {
            config,
            access_keys,
            refresh_keys,
        }
    }

    /// Generates an access token for a user session, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(
        &self,
        user_id: UserId,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let expires_at = now + Duration::seconds(self.config.access_token_expires_secs);
        Self::sign(
            &Claims::new(user_id, session_id, now, expires_at),
            &self.access_keys,
        )
    }

    /// Generates a refresh token for a user session, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_refresh_token(
        &self,
        user_id: UserId,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let expires_at = now + Duration::seconds(self.config.refresh_token_expires_secs);
        Self::sign(
            &Claims::new(user_id, session_id, now, expires_at),
            &self.refresh_keys,
        )
    }

    /// Generates both tokens for a freshly opened session.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if either token cannot be signed.
    pub fn generate_pair(
        &self,
        user_id: UserId,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair::new(
            self.generate_access_token(user_id, session_id, now)?,
            self.generate_refresh_token(user_id, session_id, now)?,
        ))
    }

    /// Validates and decodes an access token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired at `now`.
    /// Returns `JwtError::Invalid` if the token is malformed or was not
    /// signed with the access secret.
    pub fn validate_access_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, JwtError> {
        Self::verify(token, &self.access_keys, now)
    }

    /// Validates and decodes a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired at `now`.
    /// Returns `JwtError::Invalid` if the token is malformed or was not
    /// signed with the refresh secret.
    pub fn validate_refresh_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, JwtError> {
        Self::verify(token, &self.refresh_keys, now)
    }

    fn sign(claims: &Claims, keys: &KeyPair) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &keys.encoding)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    fn verify(token: &str, keys: &KeyPair, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        // `exp` must be present; its value is checked against `now` below.
        let mut validation = Validation::default();
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| JwtError::Invalid)?;

        if claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_token_expires_secs: 900,
            refresh_token_expires_secs: 3600,
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = create_test_service();
        let user_id = UserId::new();
        let session_id = SessionId::new();
        let now = Utc::now();

        let token = service
            .generate_access_token(user_id, session_id, now)
            .unwrap();
        let claims = service.validate_access_token(&token, now).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.session_id(), session_id);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + Duration::seconds(900)).timestamp());
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let service = create_test_service();
        let now = Utc::now();
        let pair = service
            .generate_pair(UserId::new(), SessionId::new(), now)
            .unwrap();

        assert!(matches!(
            service.validate_refresh_token(&pair.access_token, now),
            Err(JwtError::Invalid)
        ));
        assert!(matches!(
            service.validate_access_token(&pair.refresh_token, now),
            Err(JwtError::Invalid)
        ));
        assert!(service.validate_refresh_token(&pair.refresh_token, now).is_ok());
    }

    #[test]
    fn test_expiry_follows_the_supplied_instant() {
        let service = create_test_service();
        let issued = Utc::now() - Duration::days(30);
        let token = service
            .generate_access_token(UserId::new(), SessionId::new(), issued)
            .unwrap();

        assert!(
            service
                .validate_access_token(&token, issued + Duration::seconds(899))
                .is_ok()
        );
        assert!(matches!(
            service.validate_access_token(&token, issued + Duration::seconds(900)),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let service = create_test_service();
        assert!(matches!(
            service.validate_access_token("invalid.token.here", Utc::now()),
            Err(JwtError::Invalid)
        ));
    }
}
