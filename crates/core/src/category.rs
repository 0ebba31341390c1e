//! Category registry.
//!
//! The registry is a closed, compile-time set of labels. Exactly two of them
//! (`Salary`, `Additional Income`) classify as income; every other label is an
//! expense. [`Category::kind`] is the only place that classification lives, so
//! the sign a transaction gets when added and the sign reversed on delete can
//! never drift apart.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Income or expense classification of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming in; increases the balance.
    Income,
    /// Money going out; decreases the balance.
    Expense,
}

impl TransactionKind {
    /// Returns the signed balance effect of a positive `amount` of this kind.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

/// A transaction category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries and everyday products.
    Products,
    /// Alcohol.
    Alcohol,
    /// Entertainment.
    Entertainment,
    /// Health.
    Health,
    /// Transport.
    Transport,
    /// Housing and household items.
    Housing,
    /// Technique and electronics.
    Technique,
    /// Utilities and communication.
    #[serde(rename = "Communal, communication")]
    CommunalCommunication,
    /// Sports and hobbies.
    #[serde(rename = "Sports, hobbies")]
    SportsHobbies,
    /// Education.
    Education,
    /// Anything else.
    Other,
    /// Salary.
    Salary,
    /// Additional income.
    #[serde(rename = "Additional Income")]
    AdditionalIncome,
}

/// Error returned when a label is not part of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    /// Every category in the registry, in display order.
    pub const ALL: [Self; 13] = [
        Self::Products,
        Self::Alcohol,
        Self::Entertainment,
        Self::Health,
        Self::Transport,
        Self::Housing,
        Self::Technique,
        Self::CommunalCommunication,
        Self::SportsHobbies,
        Self::Education,
        Self::Other,
        Self::Salary,
        Self::AdditionalIncome,
    ];

    /// Returns the wire label of the category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Alcohol => "Alcohol",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Transport => "Transport",
            Self::Housing => "Housing",
            Self::Technique => "Technique",
            Self::CommunalCommunication => "Communal, communication",
            Self::SportsHobbies => "Sports, hobbies",
            Self::Education => "Education",
            Self::Other => "Other",
            Self::Salary => "Salary",
            Self::AdditionalIncome => "Additional Income",
        }
    }

    /// Classifies the category as income or expense.
    #[must_use]
    pub const fn kind(self) -> TransactionKind {
        match self {
            Self::Salary | Self::AdditionalIncome => TransactionKind::Income,
            _ => TransactionKind::Expense,
        }
    }

    /// Returns true if the category is an income category.
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self.kind(), TransactionKind::Income)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Returns the income categories.
#[must_use]
pub fn income_categories() -> Vec<Category> {
    categories_of(TransactionKind::Income)
}

/// Returns the expense categories: the full registry minus the income set.
#[must_use]
pub fn expense_categories() -> Vec<Category> {
    categories_of(TransactionKind::Expense)
}

/// Returns every category of the given kind, in registry order.
#[must_use]
pub fn categories_of(kind: TransactionKind) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|c| c.kind() == kind)
        .collect()
}
