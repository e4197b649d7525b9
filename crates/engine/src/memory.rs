//! In-memory [`TransactionStore`], used by the demo mode and by tests.

use std::{
    collections::HashSet,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    BankConnection, MonthScope, NewTransaction, StoreError, Transaction, TransactionId,
    TransactionStore,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    transactions: Mutex<Vec<Transaction>>,
    banks: Vec<BankConnection>,
    failing: Mutex<HashSet<TransactionId>>,
    latency: Duration,
    remove_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
            ..Self::default()
        }
    }

    /// Delay every write by `latency`, like a remote round trip. Reads answer
    /// immediately.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_bank_connections(mut self, banks: Vec<BankConnection>) -> Self {
        self.banks = banks;
        self
    }

    /// Make every later removal of `id` fail with a server error.
    pub fn fail_removals_of(&self, id: TransactionId) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    /// Stop injecting failures for `id`.
    pub fn heal(&self, id: TransactionId) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// How many removals reached the store, failed ones included.
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    /// Current contents, in insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, id: TransactionId) -> bool {
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|tx| tx.id == id)
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl TransactionStore for InMemoryStore {
    /// Undated transactions belong to every month.
    async fn list(&self, scope: MonthScope) -> Result<Vec<Transaction>, StoreError> {
        let transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(transactions
            .iter()
            .filter(|tx| tx.occurred_on.is_none_or(|date| scope.contains(date)))
            .cloned()
            .collect())
    }

    async fn remove(&self, id: TransactionId) -> Result<(), StoreError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await;

        if self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
        {
            return Err(StoreError::Server("simulated failure".to_string()));
        }

        let mut transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let index = transactions
            .iter()
            .position(|tx| tx.id == id)
            .ok_or(StoreError::NotFound)?;
        if !transactions[index].is_mutable() {
            return Err(StoreError::Validation(
                "imported transactions cannot be deleted".to_string(),
            ));
        }
        transactions.remove(index);
        Ok(())
    }

    async fn create(&self, new: NewTransaction) -> Result<TransactionId, StoreError> {
        self.round_trip().await;
        if new.amount.is_negative() || new.amount.is_zero() {
            return Err(StoreError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        let id = TransactionId::new();
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(new.into_transaction(id));
        Ok(id)
    }

    async fn bank_connections(&self) -> Result<Vec<BankConnection>, StoreError> {
        Ok(self.banks.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Money, Origin, TransactionKind};

    fn dated(n: u128, date: NaiveDate) -> Transaction {
        let mut tx = Transaction::manual(
            TransactionId::from_uuid(uuid::Uuid::from_u128(n)),
            TransactionKind::Expense,
            Money::new(1000),
        );
        tx.occurred_on = Some(date);
        tx
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn list_filters_by_month() {
        let march = dated(1, date(2026, 3, 2));
        let april = dated(2, date(2026, 4, 9));
        let store = InMemoryStore::new(vec![march.clone(), april]);

        let listed = store.list(MonthScope::of(date(2026, 3, 1))).await.unwrap();
        assert_eq!(listed, vec![march]);
    }

    #[tokio::test]
    async fn imported_rows_are_refused() {
        let mut tx = dated(1, date(2026, 3, 2));
        tx.origin = Origin::Imported;
        let store = InMemoryStore::new(vec![tx.clone()]);

        assert!(matches!(
            store.remove(tx.id).await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.contains(tx.id));
        assert_eq!(store.remove_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = InMemoryStore::new(Vec::new());
        assert_eq!(store.remove(TransactionId::new()).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn injected_failures_can_be_healed() {
        let tx = dated(1, date(2026, 3, 2));
        let store = InMemoryStore::new(vec![tx.clone()]);
        store.fail_removals_of(tx.id);
        assert!(matches!(store.remove(tx.id).await, Err(StoreError::Server(_))));

        store.heal(tx.id);
        store.remove(tx.id).await.unwrap();
        assert!(!store.contains(tx.id));
        assert_eq!(store.remove_calls(), 2);
    }

    #[tokio::test]
    async fn create_assigns_id_and_manual_origin() {
        let store = InMemoryStore::new(Vec::new());
        let id = store
            .create(NewTransaction {
                kind: TransactionKind::Income,
                amount: Money::new(250_000),
                category: None,
                description: Some("Salary".to_string()),
                occurred_on: date(2026, 3, 5),
                recurring: false,
            })
            .await
            .unwrap();

        let stored = store.transactions();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].origin, Origin::Manual);
    }
}
