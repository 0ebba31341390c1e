//! Aggregation engine.
//!
//! Everything is computed on read from the user's embedded transactions.

use chrono::Datelike;

use super::types::{KindStats, MonthlyStats, PeriodBreakdown, YearMonth};
use crate::category::TransactionKind;
use crate::ledger::Transaction;
use crate::user::User;

/// Statistics over a user's ledger.
pub struct StatsService;

impl StatsService {
    /// Sums amounts per calendar month of `year`.
    ///
    /// Months without a matching transaction stay `NoData`.
    pub fn monthly_stats<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        year: i32,
    ) -> MonthlyStats {
        let mut stats = MonthlyStats::default();
        for t in transactions {
            if t.date.year() == year {
                stats.record(t.date.month(), t.amount);
            }
        }
        stats
    }

    /// Partitions the ledger by category classification and aggregates the
    /// `kind` side for `year`.
    #[must_use]
    pub fn stats_for_kind(user: &User, kind: TransactionKind, year: i32) -> KindStats {
        let transactions: Vec<Transaction> = user
            .transactions
            .iter()
            .filter(|t| t.category.kind() == kind)
            .cloned()
            .collect();
        let months_stats = Self::monthly_stats(&transactions, year);

        KindStats {
            kind,
            transactions,
            months_stats,
        }
    }

    /// Category and description totals of one month, in a single pass.
    #[must_use]
    pub fn period_breakdown(user: &User, period: YearMonth) -> PeriodBreakdown {
        let mut breakdown = PeriodBreakdown::default();
        for t in user.transactions.iter().filter(|t| period.contains(t.date)) {
            match t.category.kind() {
                TransactionKind::Income => breakdown.incomes.accumulate(t),
                TransactionKind::Expense => breakdown.expenses.accumulate(t),
            }
        }
        breakdown
    }
}
