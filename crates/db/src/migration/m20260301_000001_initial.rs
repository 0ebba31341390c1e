//! Initial schema: users with embedded transactions, sessions, and the
//! access token blacklist.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS token_blacklist CASCADE;
             DROP TABLE IF EXISTS sessions CASCADE;
             DROP TABLE IF EXISTS users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) UNIQUE,
    password_hash TEXT,
    federated_id VARCHAR(255) UNIQUE,
    display_name VARCHAR(255),
    photo_url TEXT,
    origin_url TEXT,
    balance NUMERIC NOT NULL DEFAULT 0,
    transactions JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Password users and federated users are mutually exclusive
    CONSTRAINT chk_users_credentials CHECK ((password_hash IS NULL) <> (federated_id IS NULL)),
    CONSTRAINT chk_users_transactions_array CHECK (jsonb_typeof(transactions) = 'array')
);

CREATE TABLE sessions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sessions_user ON sessions(user_id);

CREATE TABLE token_blacklist (
    fingerprint CHAR(64) PRIMARY KEY,
    expires_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Sweep deletes by expiry
CREATE INDEX idx_token_blacklist_expires ON token_blacklist(expires_at);
";
