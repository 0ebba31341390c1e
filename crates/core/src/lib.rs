//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the traits in [`store`].
//!
//! # Modules
//!
//! - `category` - Closed category registry and income/expense classification
//! - `ledger` - Transaction add/delete rules over the running balance
//! - `stats` - Monthly and period aggregation
//! - `auth` - Identity, password hashing, sessions, tokens and the blacklist
//! - `store` - Storage traits and the in-memory backend
//! - `clock` - Injectable time source

pub mod auth;
pub mod category;
pub mod clock;
pub mod ledger;
pub mod stats;
pub mod store;
pub mod user;

pub use category::{Category, TransactionKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use user::{FederatedProfile, User};
