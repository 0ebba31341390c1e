//! Session & token manager.
//!
//! Issues, verifies, rotates and revokes token pairs. Every token embeds a
//! `{uid, sid}` pair and is only honored while the session row `sid` exists
//! and the token is absent from the blacklist.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tally_shared::{
    JwtService, TokenPair,
    types::{SessionId, UserId},
};

use super::{
    AccessDenied, AuthError, BlacklistEntry, IdentityService, Session, SessionEffect,
    SessionEvent, SessionState, blacklist::fingerprint,
};
use crate::clock::Clock;
use crate::store::{BlacklistStore, SessionStore, UserStore};
use crate::user::{FederatedProfile, PublicUser, User};

/// Default window a logged-out access token stays blacklisted.
pub const DEFAULT_BLACKLIST_TTL_SECS: i64 = 3600;

/// Tokens and user projection returned by a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Session the tokens belong to.
    pub sid: SessionId,
    /// Public user projection.
    pub user_data: PublicUser,
}

/// Replacement tokens issued by a refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    /// New access token.
    pub new_access_token: String,
    /// New refresh token.
    pub new_refresh_token: String,
    /// Replacement session id.
    pub new_sid: SessionId,
}

/// Identity resolved from an honored access token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// Token owner.
    pub user: User,
    /// Session backing the token.
    pub session: Session,
}

/// Coordinates identity, session rows, token signing and the blacklist.
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    blacklist: Arc<dyn BlacklistStore>,
    identity: IdentityService,
    jwt: Arc<JwtService>,
    clock: Arc<dyn Clock>,
    blacklist_ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("identity", &self.identity)
            .field("jwt", &self.jwt)
            .field("blacklist_ttl", &self.blacklist_ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager with the default blacklist window.
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        blacklist: Arc<dyn BlacklistStore>,
        identity: IdentityService,
        jwt: Arc<JwtService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            sessions,
            blacklist,
            identity,
            jwt,
            clock,
            blacklist_ttl: Duration::seconds(DEFAULT_BLACKLIST_TTL_SECS),
        }
    }

    /// Overrides how long logged-out access tokens stay blacklisted.
    #[must_use]
    pub fn with_blacklist_ttl(mut self, ttl: Duration) -> Self {
        self.blacklist_ttl = ttl;
        self
    }

    /// Identity service used for credential checks.
    pub const fn identity(&self) -> &IdentityService {
        &self.identity
    }

    /// Authenticates a password user and opens a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self.identity.authenticate(email, password).await?;
        self.open_session(&user).await
    }

    /// Resolves (or creates) a federated user and opens a session.
    pub async fn federated_login(
        &self,
        profile: &FederatedProfile,
    ) -> Result<LoginOutcome, AuthError> {
        let user = self.identity.resolve_federated(profile).await?;
        self.open_session(&user).await
    }

    /// Rotates a session.
    ///
    /// `sid` comes from the request body; `token` is the bearer refresh
    /// token. The body's session must exist before the token is even
    /// checked. A token that fails verification revokes that session. On
    /// success the ids embedded in the token, not the body, select the user
    /// and the session that gets replaced, so every refresh token is usable
    /// once.
    pub async fn refresh(
        &self,
        sid: SessionId,
        token: Option<&str>,
    ) -> Result<RefreshOutcome, AuthError> {
        let token = token.ok_or(AccessDenied::MissingToken)?;

        let Some(requested) = self.sessions.find_by_id(sid).await? else {
            return Err(AuthError::SessionNotFound);
        };

        let claims = match self.jwt.validate_refresh_token(token, self.clock.now()) {
            Ok(claims) => claims,
            Err(err) => {
                let (_, effects) = SessionState::Active(requested.id).apply(SessionEvent::Revoke)?;
                self.execute(effects).await?;
                tracing::info!(session_id = %requested.id, "refresh rejected, session revoked");
                return Err(AccessDenied::from(err).into());
            }
        };

        let Some(user) = self.users.find_by_id(claims.user_id()).await? else {
            return Err(AuthError::UserNotFound);
        };
        let Some(current) = self.sessions.find_by_id(claims.session_id()).await? else {
            return Err(AuthError::SessionNotFound);
        };

        let new_sid = SessionId::new();
        let (_, effects) = SessionState::Active(current.id).apply(SessionEvent::Rotate {
            session: new_sid,
            user: user.id,
        })?;
        self.execute(effects).await?;

        let pair = self.issue(user.id, new_sid)?;
        tracing::info!(user_id = %user.id, session_id = %new_sid, "session rotated");

        Ok(RefreshOutcome {
            new_access_token: pair.access_token,
            new_refresh_token: pair.refresh_token,
            new_sid,
        })
    }

    /// Blacklists `access_token` for the configured window, then deletes the
    /// session row.
    pub async fn logout(&self, session: &Session, access_token: &str) -> Result<(), AuthError> {
        let now = self.clock.now();
        let entry = BlacklistEntry::new(access_token, now + self.blacklist_ttl, now);
        self.blacklist.insert(&entry).await?;

        let (_, effects) = SessionState::Active(session.id).apply(SessionEvent::Logout)?;
        if self.execute(effects).await? == 0 {
            return Err(AuthError::NothingToLogOut);
        }

        tracing::info!(user_id = %session.user_id, session_id = %session.id, "logged out");
        Ok(())
    }

    /// Resolves an access token to its user and session.
    ///
    /// The blacklist is consulted before the signature.
    pub async fn verify_access(&self, token: &str) -> Result<Authenticated, AuthError> {
        if self.blacklist.contains(&fingerprint(token)).await? {
            return Err(AccessDenied::TokenBlacklisted.into());
        }

        let claims = self
            .jwt
            .validate_access_token(token, self.clock.now())
            .map_err(AccessDenied::from)?;

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AccessDenied::UserNotFound)?;
        let session = self
            .sessions
            .find_by_id(claims.session_id())
            .await?
            .ok_or(AccessDenied::SessionNotFound)?;

        Ok(Authenticated { user, session })
    }

    /// Removes blacklist entries whose window has passed.
    pub async fn sweep_blacklist(&self) -> Result<u64, AuthError> {
        Ok(self.blacklist.delete_expired(self.clock.now()).await?)
    }

    async fn open_session(&self, user: &User) -> Result<LoginOutcome, AuthError> {
        let sid = SessionId::new();
        let (_, effects) = SessionState::NoSession.apply(SessionEvent::Login {
            session: sid,
            user: user.id,
        })?;
        self.execute(effects).await?;

        let pair = self.issue(user.id, sid)?;
        tracing::info!(user_id = %user.id, session_id = %sid, "session opened");

        Ok(LoginOutcome {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            sid,
            user_data: user.public(),
        })
    }

    /// Runs store effects in order, returning how many rows were deleted.
    async fn execute(&self, effects: Vec<SessionEffect>) -> Result<usize, AuthError> {
        let mut deleted = 0;
        for effect in effects {
            match effect {
                SessionEffect::Create { id, user_id } => {
                    let session = Session {
                        id,
                        user_id,
                        created_at: self.clock.now(),
                    };
                    self.sessions.create(&session).await?;
                }
                SessionEffect::Delete(id) => {
                    if self.sessions.delete(id).await? {
                        deleted += 1;
                    }
                }
            }
        }
        Ok(deleted)
    }

    fn issue(&self, user_id: UserId, sid: SessionId) -> Result<TokenPair, AuthError> {
        self.jwt.generate_pair(user_id, sid, self.clock.now()).map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            AuthError::Signing(e)
        })
    }
}
