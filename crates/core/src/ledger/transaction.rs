//! Transaction record embedded in a user's ledger.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::TransactionId;

use crate::category::{Category, TransactionKind};

/// A single income or expense owned by one user.
///
/// `amount` is always strictly positive; the sign of its balance effect is
/// derived from `category`. Transactions are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Free-text description.
    pub description: Option<String>,
    /// Positive magnitude.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Calendar day, encoded as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Category label.
    pub category: Category,
    /// Stored copy of `category.kind()` for cheap filtering.
    pub kind: TransactionKind,
    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the signed effect of this transaction on the balance,
    /// classified from the stored category.
    #[must_use]
    pub fn balance_effect(&self) -> Decimal {
        self.category.kind().signed(self.amount)
    }

    /// Returns true if the transaction falls in the given calendar month.
    #[must_use]
    pub fn is_in_month(&self, year: i32, month: u32) -> bool {
        use chrono::Datelike;
        self.date.year() == year && self.date.month() == month
    }
}

/// Input for recording a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Free-text description.
    pub description: Option<String>,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Calendar day.
    pub date: NaiveDate,
    /// Category label.
    pub category: Category,
}

/// Outcome of adding a transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    /// Balance after the transaction was applied.
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
    /// The recorded transaction.
    pub transaction: Transaction,
}
