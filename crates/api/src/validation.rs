//! Field validators shared by request payloads.

use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_core::category::{Category, TransactionKind};
use tally_core::stats::YearMonth;
use validator::ValidationError;

/// Largest accepted amount or balance.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Accepts `1 <= value <= 1_000_000_000`.
pub fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ONE || *value > MAX_AMOUNT {
        return Err(error("range", "must be between 1 and 1000000000"));
    }
    Ok(())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Accepts a `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| error("date", "Invalid date. Use format YYYY-MM-DD"))
}

/// Accepts a `YYYY-MM` period.
pub fn validate_period(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<YearMonth>()
        .map(|_| ())
        .map_err(|_| error("period", "Invalid date. Use format YYYY-MM"))
}

/// Accepts a UUID.
pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| error("uuid", "Invalid id"))
}

/// Accepts income categories only.
pub fn validate_income_category(value: &Category) -> Result<(), ValidationError> {
    category_of_kind(*value, TransactionKind::Income)
}

/// Accepts expense categories only.
pub fn validate_expense_category(value: &Category) -> Result<(), ValidationError> {
    category_of_kind(*value, TransactionKind::Expense)
}

fn category_of_kind(value: Category, kind: TransactionKind) -> Result<(), ValidationError> {
    if value.kind() == kind {
        Ok(())
    } else {
        Err(error("category", "category does not match the transaction kind"))
    }
}
