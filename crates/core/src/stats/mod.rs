//! Aggregation engine: monthly and period statistics.

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::StatsService;
pub use types::{
    CategoryBreakdown, InvalidPeriod, KindBreakdown, KindStats, MONTH_NAMES, MonthStat,
    MonthlyStats, NO_DATA, PeriodBreakdown, TOTAL_KEY, YearMonth,
};
