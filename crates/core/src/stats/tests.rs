//! Aggregation engine tests.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::TransactionId;

use super::*;
use crate::category::{Category, TransactionKind};
use crate::ledger::Transaction;
use crate::user::User;

fn tx(category: Category, date: &str, amount: Decimal, description: Option<&str>) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        description: description.map(str::to_string),
        amount,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        category,
        kind: category.kind(),
        created_at: Utc::now(),
    }
}

fn user_with(transactions: Vec<Transaction>) -> User {
    let mut user = User::local("stats@example.com", "$argon2id$x".into(), None, Utc::now());
    user.transactions = transactions;
    user
}

#[test]
fn test_period_breakdown_february_example() {
    let user = user_with(vec![
        tx(Category::Salary, "2025-02-01", dec!(5000), Some("Job")),
        tx(Category::Products, "2025-02-03", dec!(150), Some("Groceries")),
        tx(Category::Products, "2025-02-10", dec!(50), Some("Groceries")),
        tx(Category::Products, "2025-03-01", dec!(999), Some("Groceries")),
    ]);

    let period: YearMonth = "2025-02".parse().unwrap();
    let breakdown = StatsService::period_breakdown(&user, period);

    assert_eq!(breakdown.incomes.total, dec!(5000));
    assert_eq!(breakdown.expenses.total, dec!(200));
    let products = &breakdown.expenses.data[&Category::Products];
    assert_eq!(products.total, dec!(200));
    assert_eq!(products.descriptions["Groceries"], dec!(200));
    assert_eq!(breakdown.incomes.data[&Category::Salary].total, dec!(5000));
}

#[test]
fn test_period_breakdown_splits_descriptions() {
    let user = user_with(vec![
        tx(Category::Transport, "2025-05-02", dec!(3.50), Some("Bus")),
        tx(Category::Transport, "2025-05-03", dec!(20), Some("Taxi")),
        tx(Category::Transport, "2025-05-04", dec!(3.50), Some("Bus")),
        tx(Category::Transport, "2025-05-05", dec!(1), None),
    ]);

    let breakdown = StatsService::period_breakdown(&user, "2025-05".parse().unwrap());
    let transport = &breakdown.expenses.data[&Category::Transport];

    assert_eq!(transport.total, dec!(28));
    assert_eq!(transport.descriptions["Bus"], dec!(7));
    assert_eq!(transport.descriptions["Taxi"], dec!(20));
    assert_eq!(transport.descriptions[""], dec!(1));
    assert!(breakdown.incomes.data.is_empty());
    assert_eq!(breakdown.incomes.total, Decimal::ZERO);
}

#[test]
fn test_period_breakdown_json_shape() {
    let user = user_with(vec![tx(
        Category::AdditionalIncome,
        "2025-02-01",
        dec!(10),
        Some("Gift"),
    )]);

    let json = serde_json::to_value(StatsService::period_breakdown(
        &user,
        "2025-02".parse().unwrap(),
    ))
    .unwrap();

    assert!(json["incomes"]["total"].is_number());
    let gifts = json["incomes"]["data"]["Additional Income"]
        .as_object()
        .unwrap();
    assert_eq!(gifts.len(), 2);
    assert!(gifts["total"].is_number());
    assert!(gifts["Gift"].is_number());
    assert!(json["expenses"]["data"].as_object().unwrap().is_empty());
}

#[test]
fn test_description_named_total_does_not_shadow_category_total() {
    let user = user_with(vec![
        tx(Category::Products, "2025-02-01", dec!(150), Some("Groceries")),
        tx(Category::Products, "2025-02-02", dec!(50), Some("total")),
    ]);

    let breakdown = StatsService::period_breakdown(&user, "2025-02".parse().unwrap());
    let products = &breakdown.expenses.data[&Category::Products];
    assert_eq!(products.descriptions["total"], dec!(50));

    let json = serde_json::to_value(&breakdown).unwrap();
    let products = json["expenses"]["data"]["Products"].as_object().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products["total"], serde_json::json!(200.0));
    assert_eq!(products["Groceries"], serde_json::json!(150.0));
}

#[test]
fn test_empty_month_is_no_data_not_zero() {
    let transactions = vec![
        tx(Category::Salary, "2025-01-15", dec!(100), None),
        tx(Category::Salary, "2024-02-15", dec!(100), None),
    ];

    let stats = StatsService::monthly_stats(&transactions, 2025);

    assert_eq!(stats.get(1), Some(MonthStat::Amount(dec!(100))));
    assert_eq!(stats.get(2), Some(MonthStat::NoData));
    assert_eq!(stats.get(12), Some(MonthStat::NoData));
    assert_ne!(stats.get(2), Some(MonthStat::Amount(Decimal::ZERO)));
}

#[test]
fn test_months_stats_serialize_in_calendar_order() {
    let transactions = vec![tx(Category::Health, "2025-03-01", dec!(12.5), None)];
    let stats = StatsService::monthly_stats(&transactions, 2025);

    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.starts_with("{\"January\":\"N/A\",\"February\":\"N/A\",\"March\":12.5"));
    assert!(json.ends_with("\"December\":\"N/A\"}"));
}

#[test]
fn test_stats_for_kind_partitions_by_category() {
    let user = user_with(vec![
        tx(Category::Salary, "2025-04-01", dec!(1000), None),
        tx(Category::Alcohol, "2025-04-02", dec!(30), None),
        tx(Category::AdditionalIncome, "2025-04-03", dec!(200), None),
    ]);

    let incomes = StatsService::stats_for_kind(&user, TransactionKind::Income, 2025);
    assert_eq!(incomes.transactions.len(), 2);
    assert_eq!(incomes.months_stats.get(4), Some(MonthStat::Amount(dec!(1200))));

    let expenses = StatsService::stats_for_kind(&user, TransactionKind::Expense, 2025);
    assert_eq!(expenses.transactions.len(), 1);

    let json = serde_json::to_value(&expenses).unwrap();
    assert_eq!(json["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(json["monthsStats"]["May"], "N/A");
    assert!(json.get("incomes").is_none());
}

#[test]
fn test_year_month_parsing() {
    let p: YearMonth = "2025-02".parse().unwrap();
    assert_eq!((p.year(), p.month()), (2025, 2));
    assert_eq!(p.to_string(), "2025-02");

    for bad in ["2025-13", "2025-00", "2025-2", "25-02", "2025/02", "2025-02-01", "abcd-ef"] {
        assert!(bad.parse::<YearMonth>().is_err(), "{bad} should be rejected");
    }
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn dated() -> impl Strategy<Value = (Category, NaiveDate, Decimal)> {
    (
        prop::sample::select(Category::ALL.to_vec()),
        2024i32..=2025,
        1u32..=12,
        1u32..=28,
        amount(),
    )
        .prop_map(|(c, y, m, d, a)| {
            (c, NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(), a)
        })
}

proptest! {
    #[test]
    fn prop_monthly_totals_cover_the_year(items in prop::collection::vec(dated(), 0..40)) {
        let transactions: Vec<Transaction> = items
            .iter()
            .map(|(c, d, a)| tx(*c, &d.format("%Y-%m-%d").to_string(), *a, None))
            .collect();

        let stats = StatsService::monthly_stats(&transactions, 2025);
        let from_months: Decimal = stats
            .iter()
            .filter_map(|(_, s)| match s {
                MonthStat::Amount(v) => Some(v),
                MonthStat::NoData => None,
            })
            .sum();
        let expected: Decimal = transactions
            .iter()
            .filter(|t| chrono::Datelike::year(&t.date) == 2025)
            .map(|t| t.amount)
            .sum();

        prop_assert_eq!(from_months, expected);
    }

    #[test]
    fn prop_period_totals_match_category_totals(items in prop::collection::vec(dated(), 0..40)) {
        let user = user_with(
            items
                .iter()
                .map(|(c, d, a)| tx(*c, &d.format("%Y-%m-%d").to_string(), *a, None))
                .collect(),
        );

        let breakdown = StatsService::period_breakdown(&user, YearMonth::new(2025, 6).unwrap());
        for side in [&breakdown.incomes, &breakdown.expenses] {
            let sum: Decimal = side.data.values().map(|c| c.total).sum();
            prop_assert_eq!(side.total, sum);
        }
    }
}
