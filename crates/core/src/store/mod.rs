//! Persistence collaborators.
//!
//! The core talks to storage only through these traits. Every mutation is a
//! single read-modify-write scoped to one document (a user, a session, or a
//! blacklist entry); there are no cross-document transactions.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tally_shared::{
    AppError,
    types::{SessionId, UserId},
};
use thiserror::Error;

use crate::auth::{BlacklistEntry, Session};
use crate::user::User;

pub use memory::MemoryStore;

/// Errors reported by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key (email, federated id, token) already exists.
    #[error("duplicate {0}")]
    Conflict(String),

    /// The document to replace does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A stored document could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend failed.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => Self::Conflict(err.to_string()),
            StoreError::NotFound(_) => Self::NotFound(err.to_string()),
            StoreError::Corrupt(_) | StoreError::Backend(_) => Self::Database(err.to_string()),
        }
    }
}

/// User documents, each carrying its embedded transactions.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Finds a user by federated profile id.
    async fn find_by_federated_id(&self, profile_id: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a new user. Fails with `Conflict` on a duplicate email or
    /// federated id.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Replaces the stored document, balance and transactions together.
    async fn save(&self, user: &User) -> Result<(), StoreError>;
}

/// Server-side session rows.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Finds a session by id.
    async fn find_by_id(&self, id: SessionId) -> Result<Option<Session>, StoreError>;

    /// Deletes a session, returning whether a row was removed.
    async fn delete(&self, id: SessionId) -> Result<bool, StoreError>;
}

/// Revoked access tokens awaiting natural expiry.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Records a revoked token. Re-inserting the same token keeps one entry.
    async fn insert(&self, entry: &BlacklistEntry) -> Result<(), StoreError>;

    /// Returns true if the token fingerprint is blacklisted.
    async fn contains(&self, fingerprint: &str) -> Result<bool, StoreError>;

    /// Removes entries whose `expires_at` is before `now`, returning how many
    /// were removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
