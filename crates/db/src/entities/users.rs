//! `SeaORM` Entity for users table.
//!
//! Transactions are embedded as a JSONB array so a single row write covers
//! both the balance and the list it backs.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub password_hash: Option<String>,
    #[sea_orm(unique)]
    pub federated_id: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub origin_url: Option<String>,
    #[sea_orm(column_type = "Decimal(None)")]
    pub balance: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub transactions: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
