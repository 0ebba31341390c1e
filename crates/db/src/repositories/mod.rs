//! Repository implementations of the core store traits.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod blacklist;
pub mod session;
pub mod user;

pub use blacklist::BlacklistRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};
use tally_core::store::StoreError;

/// Maps a database error onto the store taxonomy.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
        _ => {
            tracing::error!(error = %err, "database operation failed");
            StoreError::Backend(err.to_string())
        }
    }
}
