//! Session repository for database operations.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tally_core::auth::Session;
use tally_core::store::{SessionStore, StoreError};
use tally_shared::types::{SessionId, UserId};

use super::store_error;
use crate::entities::sessions;

/// Postgres-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<sessions::Model> for Session {
    fn from(model: sessions::Model) -> Self {
        Self {
            id: SessionId::from_uuid(model.id),
            user_id: UserId::from_uuid(model.user_id),
            created_at: model.created_at.to_utc(),
        }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        sessions::ActiveModel {
            id: Set(session.id.into_inner()),
            user_id: Set(session.user_id.into_inner()),
            created_at: Set(session.created_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(sessions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(Session::from))
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        let result = sessions::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }
}
