//! Ledger engine: embedded transactions and the running balance they back.

pub mod error;
pub mod service;
pub mod transaction;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::{Ledger, LedgerService};
pub use transaction::{NewTransaction, Transaction, TransactionResult};
