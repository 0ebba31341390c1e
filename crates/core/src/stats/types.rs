//! Statistics data types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::category::{Category, TransactionKind};
use crate::ledger::Transaction;

/// Month keys of [`MonthlyStats`], in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Sentinel rendered for months without any matching transaction.
pub const NO_DATA: &str = "N/A";

/// Error parsing a `YYYY-MM` period.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid period '{0}', expected YYYY-MM")]
pub struct InvalidPeriod(pub String);

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a period, returning `None` for a month outside 1..=12.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Year component.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month component, 1-based.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Returns true if `date` falls in this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for YearMonth {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPeriod(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Total of one month, or the absence of any activity.
///
/// `NoData` is distinct from `Amount(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthStat {
    /// Sum of the month's amounts.
    Amount(Decimal),
    /// No transaction fell in the month.
    #[default]
    NoData,
}

impl MonthStat {
    /// Adds `amount`, turning `NoData` into a total.
    #[must_use]
    pub fn plus(self, amount: Decimal) -> Self {
        match self {
            Self::Amount(total) => Self::Amount(total + amount),
            Self::NoData => Self::Amount(amount),
        }
    }
}

impl Serialize for MonthStat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(total) => rust_decimal::serde::float::serialize(total, serializer),
            Self::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

/// Per-month totals of one year, keyed by month name in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthlyStats([MonthStat; 12]);

impl MonthlyStats {
    /// Adds `amount` to `month` (1-based). Out-of-range months are ignored.
    pub fn record(&mut self, month: u32, amount: Decimal) {
        if let Some(slot) = month
            .checked_sub(1)
            .and_then(|i| self.0.get_mut(i as usize))
        {
            *slot = slot.plus(amount);
        }
    }

    /// Stat for `month` (1-based).
    #[must_use]
    pub fn get(&self, month: u32) -> Option<MonthStat> {
        month.checked_sub(1).and_then(|i| self.0.get(i as usize)).copied()
    }

    /// Iterates `(month name, stat)` in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, MonthStat)> + '_ {
        MONTH_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl Serialize for MonthlyStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MONTH_NAMES.len()))?;
        for (name, stat) in self.iter() {
            map.serialize_entry(name, &stat)?;
        }
        map.end()
    }
}

/// Transactions of one kind plus their per-month totals for a year.
///
/// Serialized as `{"incomes": [...], "monthsStats": {...}}` or
/// `{"expenses": [...], "monthsStats": {...}}`.
#[derive(Debug, Clone)]
pub struct KindStats {
    /// Which partition this is.
    pub kind: TransactionKind,
    /// Every transaction of this kind, in ledger order.
    pub transactions: Vec<Transaction>,
    /// Per-month totals of the requested year.
    pub months_stats: MonthlyStats,
}

impl Serialize for KindStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = match self.kind {
            TransactionKind::Income => "incomes",
            TransactionKind::Expense => "expenses",
        };
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(key, &self.transactions)?;
        map.serialize_entry("monthsStats", &self.months_stats)?;
        map.end()
    }
}

struct Float<'a>(&'a Decimal);

impl Serialize for Float<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(self.0, serializer)
    }
}

/// Key under which a category's own total is rendered.
pub const TOTAL_KEY: &str = "total";

/// One category within a period: its total and per-description subtotals.
///
/// Serialized flat, as `{"total": 200, "Groceries": 150, "Snacks": 50}`. A
/// transaction without a description is accumulated under `""`. A description
/// literally named `"total"` keeps its subtotal here but is left out of the
/// JSON object, where the key belongs to the category total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryBreakdown {
    /// Category total.
    pub total: Decimal,
    /// Subtotal per description.
    pub descriptions: BTreeMap<String, Decimal>,
}

impl Serialize for CategoryBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TOTAL_KEY, &Float(&self.total))?;
        for (description, subtotal) in &self.descriptions {
            if description != TOTAL_KEY {
                map.serialize_entry(description, &Float(subtotal))?;
            }
        }
        map.end()
    }
}

/// One kind within a period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct KindBreakdown {
    /// Total of every transaction of this kind.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Breakdown per category.
    pub data: BTreeMap<Category, CategoryBreakdown>,
}

impl KindBreakdown {
    pub(crate) fn accumulate(&mut self, transaction: &Transaction) {
        let amount = transaction.amount;
        let category = self.data.entry(transaction.category).or_default();
        let subtotal = category
            .descriptions
            .entry(transaction.description.clone().unwrap_or_default())
            .or_default();

        *subtotal += amount;
        category.total += amount;
        self.total += amount;
    }
}

/// Two-level (category, description) totals of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PeriodBreakdown {
    /// Income side.
    pub incomes: KindBreakdown,
    /// Expense side.
    pub expenses: KindBreakdown,
}
