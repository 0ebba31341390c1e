//! Ledger error types.

use rust_decimal::Decimal;
use tally_shared::{AppError, types::TransactionId};
use thiserror::Error;

use crate::category::{Category, TransactionKind};
use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transaction amount must be strictly positive.
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Category does not classify as the requested kind.
    #[error("Category {category} is not an {kind} category")]
    CategoryKindMismatch {
        /// The submitted category.
        category: Category,
        /// The kind the caller asked for.
        kind: TransactionKind,
    },

    /// Transaction not found in the user's ledger.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Persisting the user failed; nothing was applied.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::CategoryKindMismatch { .. } => "CATEGORY_KIND_MISMATCH",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::TransactionNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::NonPositiveAmount(_) | LedgerError::CategoryKindMismatch { .. } => {
                Self::Validation(err.to_string())
            }
            LedgerError::Store(e) => e.into(),
        }
    }
}
