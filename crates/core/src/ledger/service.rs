//! Ledger engine.
//!
//! [`LedgerService`] holds the pure balance rules; [`Ledger`] wraps them with
//! persistence. A mutation is prepared on a copy of the user, written with a
//! single `save`, and only then committed to the caller's value, so the
//! balance and the transaction list never diverge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tally_shared::types::TransactionId;

use super::error::LedgerError;
use super::transaction::{NewTransaction, Transaction, TransactionResult};
use crate::category::TransactionKind;
use crate::clock::Clock;
use crate::store::UserStore;
use crate::user::User;

/// Pure balance rules.
pub struct LedgerService;

impl LedgerService {
    /// Appends a transaction and applies its signed effect to the balance.
    ///
    /// # Errors
    ///
    /// - `NonPositiveAmount` if `amount <= 0`
    /// - `CategoryKindMismatch` if the category does not classify as `kind`
    pub fn apply_transaction(
        user: &mut User,
        input: NewTransaction,
        kind: TransactionKind,
        now: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(input.amount));
        }
        if input.category.kind() != kind {
            return Err(LedgerError::CategoryKindMismatch {
                category: input.category,
                kind,
            });
        }

        let transaction = Transaction {
            id: TransactionId::new(),
            description: input.description,
            amount: input.amount,
            date: input.date,
            category: input.category,
            kind,
            created_at: now,
        };

        user.balance += transaction.balance_effect();
        user.transactions.push(transaction.clone());
        user.updated_at = now;

        Ok(transaction)
    }

    /// Removes a transaction and reverses its effect.
    ///
    /// The reversal is classified from the stored category. On
    /// `TransactionNotFound` the user is left untouched.
    pub fn remove_transaction(
        user: &mut User,
        id: TransactionId,
        now: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let index = user
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let removed = user.transactions.remove(index);
        user.balance -= removed.balance_effect();
        user.updated_at = now;

        Ok(removed)
    }

    /// Recomputes the balance implied by a transaction list.
    #[must_use]
    pub fn replay_balance(transactions: &[Transaction]) -> Decimal {
        transactions.iter().map(Transaction::balance_effect).sum()
    }
}

/// Persisting ledger operations.
#[derive(Clone)]
pub struct Ledger {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

impl Ledger {
    /// Creates a ledger over `users`.
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// Records an income or expense and persists the user.
    pub async fn add_transaction(
        &self,
        user: &mut User,
        input: NewTransaction,
        kind: TransactionKind,
    ) -> Result<TransactionResult, LedgerError> {
        let mut draft = user.clone();
        let transaction =
            LedgerService::apply_transaction(&mut draft, input, kind, self.clock.now())?;
        self.commit(user, draft).await?;

        tracing::debug!(
            user_id = %user.id,
            transaction_id = %transaction.id,
            %kind,
            "transaction added"
        );

        Ok(TransactionResult {
            new_balance: user.balance,
            transaction,
        })
    }

    /// Deletes a transaction and persists the user, returning the new balance.
    pub async fn delete_transaction(
        &self,
        user: &mut User,
        id: TransactionId,
    ) -> Result<Decimal, LedgerError> {
        let mut draft = user.clone();
        LedgerService::remove_transaction(&mut draft, id, self.clock.now())?;
        self.commit(user, draft).await?;

        tracing::debug!(user_id = %user.id, transaction_id = %id, "transaction deleted");
        Ok(user.balance)
    }

    /// Overwrites the balance without touching transactions.
    pub async fn set_balance(
        &self,
        user: &mut User,
        new_balance: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let mut draft = user.clone();
        draft.balance = new_balance;
        draft.updated_at = self.clock.now();
        self.commit(user, draft).await?;

        tracing::debug!(user_id = %user.id, "balance overwritten");
        Ok(user.balance)
    }

    async fn commit(&self, user: &mut User, draft: User) -> Result<(), LedgerError> {
        self.users.save(&draft).await.map_err(|e| {
            tracing::error!(user_id = %draft.id, error = %e, "failed to persist ledger change");
            e
        })?;
        *user = draft;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::clock::SystemClock;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn user() -> User {
        User::local("ledger@example.com", "$argon2id$x".into(), None, Utc::now())
    }

    fn input(category: Category, amount: Decimal) -> NewTransaction {
        NewTransaction {
            description: Some("test".into()),
            amount,
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            category,
        }
    }

    #[test]
    fn test_income_raises_and_expense_lowers_balance() {
        let mut u = user();
        LedgerService::apply_transaction(
            &mut u,
            input(Category::Salary, dec!(5000)),
            TransactionKind::Income,
            Utc::now(),
        )
        .unwrap();
        LedgerService::apply_transaction(
            &mut u,
            input(Category::Products, dec!(150.25)),
            TransactionKind::Expense,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(u.balance, dec!(4849.75));
        assert_eq!(u.transactions.len(), 2);
        assert_eq!(u.transactions[1].kind, TransactionKind::Expense);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut u = user();
        let err = LedgerService::apply_transaction(
            &mut u,
            input(Category::Salary, dec!(0)),
            TransactionKind::Income,
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, LedgerError::NonPositiveAmount(_)));
        assert!(u.transactions.is_empty());
    }

    #[test]
    fn test_rejects_category_of_other_kind() {
        let mut u = user();
        let err = LedgerService::apply_transaction(
            &mut u,
            input(Category::Products, dec!(10)),
            TransactionKind::Income,
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, LedgerError::CategoryKindMismatch { .. }));
        assert_eq!(u.balance, Decimal::ZERO);
    }

    #[test]
    fn test_remove_reverses_effect() {
        let mut u = user();
        let t = LedgerService::apply_transaction(
            &mut u,
            input(Category::Transport, dec!(40)),
            TransactionKind::Expense,
            Utc::now(),
        )
        .unwrap();

        LedgerService::remove_transaction(&mut u, t.id, Utc::now()).unwrap();

        assert_eq!(u.balance, Decimal::ZERO);
        assert!(u.transactions.is_empty());
    }

    #[test]
    fn test_remove_unknown_leaves_user_untouched() {
        let mut u = user();
        LedgerService::apply_transaction(
            &mut u,
            input(Category::Salary, dec!(100)),
            TransactionKind::Income,
            Utc::now(),
        )
        .unwrap();
        let before = u.clone();

        let err =
            LedgerService::remove_transaction(&mut u, TransactionId::new(), Utc::now()).unwrap_err();

        assert!(matches!(err, LedgerError::TransactionNotFound(_)));
        assert_eq!(u, before);
    }

    #[tokio::test]
    async fn test_ledger_persists_balance_and_list_together() {
        let store = Arc::new(MemoryStore::new());
        let mut u = user();
        UserStore::insert(&*store, &u).await.unwrap();
        let ledger = Ledger::new(store.clone(), Arc::new(SystemClock));

        let result = ledger
            .add_transaction(&mut u, input(Category::Salary, dec!(300)), TransactionKind::Income)
            .await
            .unwrap();
        assert_eq!(result.new_balance, dec!(300));

        let stored = store.find_by_email("ledger@example.com").await.unwrap().unwrap();
        assert_eq!(stored.balance, dec!(300));
        assert_eq!(stored.transactions, vec![result.transaction.clone()]);

        let balance = ledger
            .delete_transaction(&mut u, result.transaction.id)
            .await
            .unwrap();
        assert_eq!(balance, Decimal::ZERO);

        let stored = store.find_by_email("ledger@example.com").await.unwrap().unwrap();
        assert!(stored.transactions.is_empty());
        assert_eq!(stored, u);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_caller_untouched() {
        // Never inserted, so `save` reports NotFound.
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store, Arc::new(SystemClock));
        let mut u = user();
        let before = u.clone();

        let err = ledger
            .add_transaction(&mut u, input(Category::Salary, dec!(1)), TransactionKind::Income)
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Store(_)));
        assert_eq!(u, before);
    }

    #[tokio::test]
    async fn test_set_balance_keeps_transactions() {
        let store = Arc::new(MemoryStore::new());
        let mut u = user();
        UserStore::insert(&*store, &u).await.unwrap();
        let ledger = Ledger::new(store, Arc::new(SystemClock));
        ledger
            .add_transaction(&mut u, input(Category::Health, dec!(20)), TransactionKind::Expense)
            .await
            .unwrap();

        let balance = ledger.set_balance(&mut u, dec!(1000)).await.unwrap();

        assert_eq!(balance, dec!(1000));
        assert_eq!(u.transactions.len(), 1);
    }
}
