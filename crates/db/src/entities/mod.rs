//! `SeaORM` entity definitions.

pub mod sessions;
pub mod token_blacklist;
pub mod users;
