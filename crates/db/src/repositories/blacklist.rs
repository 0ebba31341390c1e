//! Access token blacklist repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use tally_core::auth::BlacklistEntry;
use tally_core::store::{BlacklistStore, StoreError};

use super::store_error;
use crate::entities::token_blacklist;

/// Postgres-backed [`BlacklistStore`].
#[derive(Debug, Clone)]
pub struct BlacklistRepository {
    db: DatabaseConnection,
}

impl BlacklistRepository {
    /// Creates a new blacklist repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlacklistStore for BlacklistRepository {
    async fn insert(&self, entry: &BlacklistEntry) -> Result<(), StoreError> {
        let model = token_blacklist::ActiveModel {
            fingerprint: Set(entry.fingerprint.clone()),
            expires_at: Set(entry.expires_at.into()),
            created_at: Set(entry.created_at.into()),
        };

        token_blacklist::Entity::insert(model)
            .on_conflict(
                OnConflict::column(token_blacklist::Column::Fingerprint)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn contains(&self, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(token_blacklist::Entity::find_by_id(fingerprint.to_string())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = token_blacklist::Entity::delete_many()
            .filter(token_blacklist::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected)
    }
}
