//! `SeaORM` Entity for token_blacklist table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "token_blacklist")]
pub struct Model {
    /// SHA-256 hex of the revoked access token.
    #[sea_orm(primary_key, auto_increment = false)]
    pub fingerprint: String,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
