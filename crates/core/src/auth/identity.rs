//! Identity resolution: password and federated credentials to user records.

use std::sync::Arc;

use serde::Serialize;
use tally_shared::types::UserId;

use super::{AuthError, PasswordConfig, hash_password, verify_password};
use crate::clock::Clock;
use crate::store::{StoreError, UserStore};
use crate::user::{FederatedProfile, User};

const DECOY_PASSWORD: &str = "decoy-password-never-matches-a-login";

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    /// Registered email.
    pub email: String,
    /// New user id.
    pub id: UserId,
}

/// Resolves credentials to persisted users, creating them on first contact.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    password: PasswordConfig,
    clock: Arc<dyn Clock>,
    /// Hash verified against when there is no real one, so every rejected
    /// login costs one argon2 run under the configured work factor.
    decoy_hash: Option<Arc<str>>,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService")
            .field("password", &self.password)
            .finish_non_exhaustive()
    }
}

impl IdentityService {
    /// Creates the service.
    pub fn new(users: Arc<dyn UserStore>, password: PasswordConfig, clock: Arc<dyn Clock>) -> Self {
        let decoy_hash = match hash_password(DECOY_PASSWORD, &password) {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                tracing::error!(error = %e, "failed to prepare decoy password hash");
                None
            }
        };

        Self {
            users,
            password,
            clock,
            decoy_hash,
        }
    }

    /// Registers a password user with a zero balance and an empty ledger.
    ///
    /// `origin` is the `Origin` of the registering client, recorded as the
    /// account's creation origin.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        origin: Option<&str>,
    ) -> Result<RegisteredUser, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken(email.to_string()));
        }

        let hash = hash_password(password, &self.password)?;
        let user = User::local(email, hash, origin, self.clock.now());

        // A concurrent registration can still win the unique index.
        self.users.insert(&user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::EmailTaken(email.to_string()),
            other => AuthError::Store(other),
        })?;

        tracing::info!(user_id = %user.id, "user registered");

        Ok(RegisteredUser {
            email: email.to_string(),
            id: user.id,
        })
    }

    /// Returns the user with `email` if `password` matches.
    ///
    /// Unknown emails, wrong passwords and federated-only accounts all fail
    /// with [`AuthError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.verify_decoy(password);
            tracing::info!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(hash) = user.password_hash.as_deref() else {
            self.verify_decoy(password);
            tracing::info!(user_id = %user.id, "login rejected: account has no password");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, hash)? {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    fn verify_decoy(&self, password: &str) {
        if let Some(hash) = &self.decoy_hash {
            let _ = verify_password(password, hash);
        }
    }

    /// Returns the user linked to a federated profile, creating it if needed.
    ///
    /// A profile whose email already belongs to another account fails with a
    /// store conflict.
    pub async fn resolve_federated(&self, profile: &FederatedProfile) -> Result<User, AuthError> {
        if let Some(user) = self.users.find_by_federated_id(&profile.profile_id).await? {
            return Ok(user);
        }

        let user = User::federated(profile, self.clock.now());
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "federated user created");
        Ok(user)
    }
}
