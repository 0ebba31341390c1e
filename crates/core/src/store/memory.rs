//! In-memory implementation of the store traits.
//!
//! Suitable for development and testing. Production deployments use the
//! Postgres repositories in `tally-db`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use tally_shared::types::{SessionId, UserId};

use super::{BlacklistStore, SessionStore, StoreError, UserStore};
use crate::auth::{BlacklistEntry, Session};
use crate::user::User;

/// Process-local store backed by concurrent hash maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    by_email: DashMap<String, UserId>,
    by_federated_id: DashMap<String, UserId>,
    sessions: DashMap<SessionId, Session>,
    blacklist: DashMap<String, BlacklistEntry>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of blacklist entries still stored.
    #[must_use]
    pub fn blacklist_len(&self) -> usize {
        self.blacklist.len()
    }

    fn lookup(&self, index: &DashMap<String, UserId>, key: &str) -> Option<User> {
        let id = *index.get(key)?;
        self.users.get(&id).map(|u| u.clone())
    }
}

/// Same rule as the `users` table CHECK: exactly one credential.
fn ensure_credentials(user: &User) -> Result<(), StoreError> {
    if user.has_consistent_credentials() {
        Ok(())
    } else {
        Err(StoreError::Corrupt(format!(
            "user {} must carry exactly one of password hash and federated id",
            user.id
        )))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lookup(&self.by_email, email))
    }

    async fn find_by_federated_id(&self, profile_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lookup(&self.by_federated_id, profile_id))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        ensure_credentials(user)?;

        if let Some(email) = &user.email {
            match self.by_email.entry(email.clone()) {
                Entry::Occupied(_) => return Err(StoreError::Conflict(format!("email {email}"))),
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
        }

        if let Some(profile_id) = &user.federated_id {
            match self.by_federated_id.entry(profile_id.clone()) {
                Entry::Occupied(_) => {
                    if let Some(email) = &user.email {
                        self.by_email.remove(email);
                    }
                    return Err(StoreError::Conflict(format!("federated id {profile_id}")));
                }
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
        }

        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        ensure_credentials(user)?;

        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;
        *stored = user.clone();
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.sessions.remove(&id).is_some())
    }
}

#[async_trait]
impl BlacklistStore for MemoryStore {
    async fn insert(&self, entry: &BlacklistEntry) -> Result<(), StoreError> {
        self.blacklist
            .insert(entry.fingerprint.clone(), entry.clone());
        Ok(())
    }

    async fn contains(&self, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(self.blacklist.contains_key(fingerprint))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut removed = 0_u64;
        self.blacklist.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
