//! Property-based tests for the ledger balance rules.
//!
//! - Balance equals the replayed sum of the transactions still present
//! - Deleting and re-adding an identical transaction is balance-neutral

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::LedgerService;
use super::transaction::NewTransaction;
use crate::category::Category;
use crate::user::User;

/// Positive amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn any_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

#[derive(Debug, Clone)]
enum Op {
    Add(Category, Decimal),
    /// Delete the transaction at `index % len`, if any.
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any_category(), positive_amount()).prop_map(|(c, a)| Op::Add(c, a)),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

fn new_user() -> User {
    User::local("prop@example.com", "$argon2id$x".into(), None, Utc::now())
}

fn new_tx(category: Category, amount: Decimal) -> NewTransaction {
    NewTransaction {
        description: None,
        amount,
        date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default(),
        category,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_balance_matches_replay(ops in prop::collection::vec(op(), 0..60)) {
        let mut user = new_user();

        for op in ops {
            match op {
                Op::Add(category, amount) => {
                    LedgerService::apply_transaction(
                        &mut user,
                        new_tx(category, amount),
                        category.kind(),
                        Utc::now(),
                    )
                    .unwrap();
                }
                Op::Delete(index) => {
                    if user.transactions.is_empty() {
                        continue;
                    }
                    let id = user.transactions[index % user.transactions.len()].id;
                    LedgerService::remove_transaction(&mut user, id, Utc::now()).unwrap();
                }
            }

            prop_assert_eq!(user.balance, LedgerService::replay_balance(&user.transactions));
        }
    }

    #[test]
    fn prop_delete_then_readd_is_neutral(
        seed in prop::collection::vec((any_category(), positive_amount()), 1..20),
        pick in any::<usize>(),
    ) {
        let mut user = new_user();
        for (category, amount) in seed {
            LedgerService::apply_transaction(
                &mut user,
                new_tx(category, amount),
                category.kind(),
                Utc::now(),
            )
            .unwrap();
        }
        let before = user.balance;

        let target = user.transactions[pick % user.transactions.len()].clone();
        LedgerService::remove_transaction(&mut user, target.id, Utc::now()).unwrap();
        LedgerService::apply_transaction(
            &mut user,
            NewTransaction {
                description: target.description,
                amount: target.amount,
                date: target.date,
                category: target.category,
            },
            target.kind,
            Utc::now(),
        )
        .unwrap();

        prop_assert_eq!(user.balance, before);
    }
}
