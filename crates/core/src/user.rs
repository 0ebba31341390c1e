//! User aggregate: identity, credentials, and the embedded ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::UserId;

use crate::ledger::Transaction;

/// Marker stored for local registrations that arrive without an `Origin` header.
pub const UNKNOWN_ORIGIN: &str = "-";

/// A user and the ledger they own.
///
/// Invariants:
/// - `password_hash` is present exactly when `federated_id` is absent.
/// - `balance` equals the sum of the signed effects of `transactions`,
///   unless it was overwritten directly.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Unique email address.
    pub email: Option<String>,
    /// Argon2 PHC string; absent for federated-only accounts.
    pub password_hash: Option<String>,
    /// External identity provider profile id.
    pub federated_id: Option<String>,
    /// Display name supplied by the identity provider.
    pub display_name: Option<String>,
    /// Avatar URL supplied by the identity provider.
    pub photo_url: Option<String>,
    /// Where the account was created from (`Origin` header of the registration).
    pub origin_url: Option<String>,
    /// Running balance.
    pub balance: Decimal,
    /// Embedded transactions, in insertion order.
    pub transactions: Vec<Transaction>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a password-authenticated user with an empty ledger.
    #[must_use]
    pub fn local(
        email: &str,
        password_hash: String,
        origin_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: Some(email.to_string()),
            password_hash: Some(password_hash),
            federated_id: None,
            display_name: None,
            photo_url: None,
            origin_url: Some(origin_url.unwrap_or(UNKNOWN_ORIGIN).to_string()),
            balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a user from a federated identity, without a password.
    #[must_use]
    pub fn federated(profile: &FederatedProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email: Some(profile.email.clone()),
            password_hash: None,
            federated_id: Some(profile.profile_id.clone()),
            display_name: Some(profile.display_name.clone()),
            photo_url: profile.photo_url.clone(),
            origin_url: None,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the credential invariant holds.
    #[must_use]
    pub const fn has_consistent_credentials(&self) -> bool {
        self.password_hash.is_some() != self.federated_id.is_some()
    }

    /// Projection returned on login.
    #[must_use]
    pub fn public(&self) -> PublicUser {
        PublicUser {
            email: self.email.clone(),
            balance: self.balance,
            id: self.id,
            transactions: self.transactions.clone(),
        }
    }

    /// Projection returned by the user data endpoint.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            email: self.email.clone(),
            balance: self.balance,
            transactions: self.transactions.clone(),
        }
    }
}

/// Profile tuple handed over by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedProfile {
    /// Stable provider-side id.
    pub profile_id: String,
    /// Primary email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Avatar URL.
    pub photo_url: Option<String>,
}

/// Public view of a user. Never carries the credential hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    /// Email address.
    pub email: Option<String>,
    /// Running balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// User id.
    pub id: UserId,
    /// Embedded transactions.
    pub transactions: Vec<Transaction>,
}

/// Account data without the id.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// Email address.
    pub email: Option<String>,
    /// Running balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Embedded transactions.
    pub transactions: Vec<Transaction>,
}
