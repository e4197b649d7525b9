//! Remote mutations, serialized per transaction id.
//!
//! The executor does not recover from failures: it reports them, and the
//! caller rolls back whatever it applied optimistically.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    EngineError, MutationError, NewTransaction, TransactionId, TransactionStore,
};

type InFlight = Arc<Mutex<HashSet<TransactionId>>>;

/// Performs writes against a [`TransactionStore`].
///
/// At most one removal per id is in flight; a second request for the same id
/// is rejected with [`EngineError::AlreadyPending`] instead of being queued.
///
/// Cheap to clone: clones share the store and the in-flight table.
#[derive(Debug)]
pub struct MutationExecutor<S> {
    store: Arc<S>,
    in_flight: InFlight,
}

impl<S> Clone for MutationExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: TransactionStore> MutationExecutor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            in_flight: Arc::default(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn is_pending(&self, id: TransactionId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Claim the removal slot for `id` without touching the store yet.
    ///
    /// The slot is released when the returned [`Reservation`] is dropped,
    /// whether or not the removal ran.
    pub fn reserve(&self, id: TransactionId) -> Result<Reservation<S>, EngineError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id) {
            tracing::debug!(%id, "removal already in flight");
            return Err(EngineError::AlreadyPending(id));
        }
        Ok(Reservation {
            id,
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Remove `id` from the store.
    pub async fn remove(&self, id: TransactionId) -> Result<(), EngineError> {
        self.reserve(id)?.remove().await?;
        Ok(())
    }

    pub async fn create(&self, new: NewTransaction) -> Result<TransactionId, EngineError> {
        let kind = new.kind;
        let id = self.store.create(new).await.inspect_err(|err| {
            tracing::warn!(kind = kind.as_str(), "create failed: {err}");
        })?;
        tracing::debug!(%id, kind = kind.as_str(), "transaction created");
        Ok(id)
    }
}

/// An exclusive claim on the removal of one transaction.
#[derive(Debug)]
#[must_use = "dropping a reservation releases the slot without removing anything"]
pub struct Reservation<S> {
    id: TransactionId,
    store: Arc<S>,
    in_flight: InFlight,
}

impl<S: TransactionStore> Reservation<S> {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Run the remote removal, consuming the claim.
    pub async fn remove(self) -> Result<(), MutationError> {
        let id = self.id;
        match self.store.remove(id).await {
            Ok(()) => {
                tracing::debug!(%id, "removal committed");
                Ok(())
            }
            Err(cause) => {
                tracing::warn!(%id, "removal failed: {cause}");
                Err(MutationError { id, cause })
            }
        }
    }
}

impl<S> Drop for Reservation<S> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryStore, Money, StoreError, Transaction, TransactionKind};

    fn expense(n: u128, minor: i64) -> Transaction {
        Transaction::manual(
            TransactionId::from_uuid(uuid::Uuid::from_u128(n)),
            TransactionKind::Expense,
            Money::new(minor),
        )
    }

    #[tokio::test]
    async fn second_reservation_for_same_id_is_rejected() {
        let tx = expense(1, 5000);
        let executor = MutationExecutor::new(Arc::new(InMemoryStore::new(vec![tx.clone()])));

        let first = executor.reserve(tx.id).unwrap();
        assert!(executor.is_pending(tx.id));
        assert!(matches!(
            executor.reserve(tx.id),
            Err(EngineError::AlreadyPending(id)) if id == tx.id
        ));

        first.remove().await.unwrap();
        assert!(!executor.is_pending(tx.id));
        assert_eq!(executor.store().remove_calls(), 1);
    }

    #[tokio::test]
    async fn dropping_a_reservation_frees_the_slot() {
        let tx = expense(1, 5000);
        let executor = MutationExecutor::new(Arc::new(InMemoryStore::new(vec![tx.clone()])));

        drop(executor.reserve(tx.id).unwrap());
        assert!(executor.reserve(tx.id).is_ok());
        assert_eq!(executor.store().remove_calls(), 0);
    }

    #[tokio::test]
    async fn failures_carry_the_id_and_release_the_slot() {
        let tx = expense(7, 100);
        let store = InMemoryStore::new(vec![tx.clone()]);
        store.fail_removals_of(tx.id);
        let executor = MutationExecutor::new(Arc::new(store));

        let err = executor.remove(tx.id).await.unwrap_err();
        match err {
            EngineError::Mutation(MutationError { id, cause }) => {
                assert_eq!(id, tx.id);
                assert!(matches!(cause, StoreError::Server(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!executor.is_pending(tx.id));
    }

    #[tokio::test]
    async fn different_ids_do_not_interfere() {
        let a = expense(1, 100);
        let b = expense(2, 200);
        let executor =
            MutationExecutor::new(Arc::new(InMemoryStore::new(vec![a.clone(), b.clone()])));

        let ra = executor.reserve(a.id).unwrap();
        let rb = executor.reserve(b.id).unwrap();
        let (ra, rb) = tokio::join!(ra.remove(), rb.remove());
        ra.unwrap();
        rb.unwrap();
        assert_eq!(executor.store().remove_calls(), 2);
    }
}
