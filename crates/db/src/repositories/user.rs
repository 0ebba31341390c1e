//! User repository for database operations.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tally_core::ledger::Transaction;
use tally_core::store::{StoreError, UserStore};
use tally_core::user::User;
use tally_shared::types::UserId;

use super::store_error;
use crate::entities::users;

/// Postgres-backed [`UserStore`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        query: sea_orm::Select<users::Entity>,
    ) -> Result<Option<User>, StoreError> {
        query
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(from_model)
            .transpose()
    }
}

/// Decodes a row, including its embedded transactions.
pub(crate) fn from_model(model: users::Model) -> Result<User, StoreError> {
    let transactions: Vec<Transaction> = serde_json::from_value(model.transactions)
        .map_err(|e| StoreError::Corrupt(format!("user {} transactions: {e}", model.id)))?;

    Ok(User {
        id: UserId::from_uuid(model.id),
        email: model.email,
        password_hash: model.password_hash,
        federated_id: model.federated_id,
        display_name: model.display_name,
        photo_url: model.photo_url,
        origin_url: model.origin_url,
        balance: model.balance,
        transactions,
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}

/// Encodes a user as a fully-set active model.
pub(crate) fn to_active_model(user: &User) -> Result<users::ActiveModel, StoreError> {
    if !user.has_consistent_credentials() {
        return Err(StoreError::Corrupt(format!(
            "user {} must carry exactly one of password hash and federated id",
            user.id
        )));
    }

    let transactions = serde_json::to_value(&user.transactions)
        .map_err(|e| StoreError::Corrupt(format!("user {} transactions: {e}", user.id)))?;

    Ok(users::ActiveModel {
        id: Set(user.id.into_inner()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        federated_id: Set(user.federated_id.clone()),
        display_name: Set(user.display_name.clone()),
        photo_url: Set(user.photo_url.clone()),
        origin_url: Set(user.origin_url.clone()),
        balance: Set(user.balance),
        transactions: Set(transactions),
        created_at: Set(user.created_at.into()),
        updated_at: Set(user.updated_at.into()),
    })
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.find_one(users::Entity::find_by_id(id.into_inner())).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one(users::Entity::find().filter(users::Column::Email.eq(email)))
            .await
    }

    async fn find_by_federated_id(&self, profile_id: &str) -> Result<Option<User>, StoreError> {
        self.find_one(users::Entity::find().filter(users::Column::FederatedId.eq(profile_id)))
            .await
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        to_active_model(user)?
            .insert(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        match to_active_model(user)?.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::NotFound(format!("user {}", user.id))),
            Err(e) => Err(store_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::ActiveValue;
    use tally_core::category::{Category, TransactionKind};
    use tally_shared::types::TransactionId;

    fn sample() -> User {
        let mut user = User::local("db@example.com", "$argon2id$x".into(), Some("-"), Utc::now());
        user.balance = dec!(-12.34);
        user.transactions.push(Transaction {
            id: TransactionId::new(),
            description: Some("Lunch".into()),
            amount: dec!(12.34),
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            category: Category::Products,
            kind: TransactionKind::Expense,
            created_at: Utc::now(),
        });
        user
    }

    #[test]
    fn test_active_model_embeds_transactions_as_array() {
        let user = sample();
        let model = to_active_model(&user).unwrap();

        let ActiveValue::Set(json) = model.transactions else {
            panic!("transactions not set");
        };
        let array = json.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["category"], "Products");
        assert_eq!(array[0]["date"], "2025-02-03");
    }

    #[test]
    fn test_active_model_refuses_user_without_credential() {
        let mut user = sample();
        user.password_hash = None;

        assert!(matches!(
            to_active_model(&user),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_model_roundtrip_preserves_user() {
        let user = sample();
        let model = users::Model {
            id: user.id.into_inner(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            federated_id: None,
            display_name: None,
            photo_url: None,
            origin_url: user.origin_url.clone(),
            balance: user.balance,
            transactions: serde_json::to_value(&user.transactions).unwrap(),
            created_at: user.created_at.into(),
            updated_at: user.updated_at.into(),
        };

        let decoded = from_model(model).unwrap();
        assert_eq!(decoded.transactions, user.transactions);
        assert_eq!(decoded.balance, user.balance);
        assert_eq!(decoded.email, user.email);
    }

    #[test]
    fn test_corrupt_transactions_are_reported() {
        let now = Utc::now();
        let model = users::Model {
            id: uuid::Uuid::new_v4(),
            email: None,
            password_hash: None,
            federated_id: Some("x".into()),
            display_name: None,
            photo_url: None,
            origin_url: None,
            balance: dec!(0),
            transactions: serde_json::json!({"not": "an array"}),
            created_at: now.into(),
            updated_at: now.into(),
        };

        assert!(matches!(from_model(model), Err(StoreError::Corrupt(_))));
    }
}
