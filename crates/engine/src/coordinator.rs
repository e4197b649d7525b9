//! Optimistic removal of list rows.
//!
//! Deleting a row starts two tasks that race each other:
//!
//! - a timer that elapses once the removal transition has played, and
//! - the remote removal through the [`MutationExecutor`].
//!
//! Both report to a single settlement channel, drained by the owning view with
//! [`RemovalCoordinator::resolve_ready`] or [`RemovalCoordinator::resolve_next`].
//! A row is hidden only once both the timer elapsed and the removal committed.
//! A failed removal restores the row immediately, whether or not the timer
//! already elapsed.
//!
//! `open`/`close` bump a generation counter. Settlements produced under an
//! older generation belong to a torn-down view and are ignored, while the
//! remote removal itself still runs to completion. Within one generation every
//! cycle has its own ticket, so the timer of a rolled-back cycle cannot
//! resolve a later retry of the same row.

use std::{collections::HashMap, time::Duration};

use tokio::sync::mpsc;

use crate::{
    EngineError, InvalidationBroadcaster, InvalidationEvent, MonthScope, MutationError,
    MutationExecutor, Transaction, TransactionId, TransactionStore, VisibilityState,
};

/// Length of the removal transition.
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug)]
enum Signal {
    TimerElapsed,
    Mutation(Result<(), MutationError>),
}

#[derive(Debug)]
struct Settlement {
    generation: u64,
    ticket: u64,
    id: TransactionId,
    signal: Signal,
}

/// Progress of one removal cycle.
#[derive(Debug)]
struct Cycle {
    ticket: u64,
    timer_elapsed: bool,
    committed: bool,
}

/// What a settlement did to the view.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The store confirmed the removal; the row is still animating out.
    Committed(TransactionId),
    /// The transition finished; the row waits for the store.
    AwaitingCommit(TransactionId),
    /// The row is gone from the rendered list.
    Hidden(TransactionId),
    /// The store refused the removal and the row is visible again.
    RolledBack(MutationError),
}

pub struct RemovalCoordinator<S> {
    executor: MutationExecutor<S>,
    broadcaster: InvalidationBroadcaster,
    visibility: VisibilityState,
    cycles: HashMap<TransactionId, Cycle>,
    scope: Option<MonthScope>,
    generation: u64,
    next_ticket: u64,
    delay: Duration,
    settle_tx: mpsc::UnboundedSender<Settlement>,
    settle_rx: mpsc::UnboundedReceiver<Settlement>,
}

impl<S> core::fmt::Debug for RemovalCoordinator<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RemovalCoordinator")
            .field("visibility", &self.visibility)
            .field("in_flight", &self.cycles.len())
            .field("scope", &self.scope)
            .field("generation", &self.generation)
            .field("delay", &self.delay)
            .finish()
    }
}

impl<S: TransactionStore> RemovalCoordinator<S> {
    pub fn new(executor: MutationExecutor<S>, broadcaster: InvalidationBroadcaster) -> Self {
        let (settle_tx, settle_rx) = mpsc::unbounded_channel();
        Self {
            executor,
            broadcaster,
            visibility: VisibilityState::new(),
            cycles: HashMap::new(),
            scope: None,
            generation: 0,
            next_ticket: 0,
            delay: DEFAULT_REMOVAL_DELAY,
            settle_tx,
            settle_rx,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn executor(&self) -> &MutationExecutor<S> {
        &self.executor
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    pub fn scope(&self) -> Option<MonthScope> {
        self.scope
    }

    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }

    /// Number of removal cycles this view still waits on.
    pub fn in_flight(&self) -> usize {
        self.cycles.len()
    }

    pub fn open(&mut self, scope: MonthScope) {
        self.teardown();
        self.scope = Some(scope);
        tracing::debug!(%scope, generation = self.generation, "list view opened");
    }

    /// Discard all local state. In-flight removals keep running remotely.
    pub fn close(&mut self) {
        self.teardown();
        self.scope = None;
        tracing::debug!(generation = self.generation, "list view closed");
    }

    fn teardown(&mut self) {
        self.generation += 1;
        self.visibility.reset();
        self.cycles.clear();
    }

    /// Start the optimistic removal of `tx`.
    ///
    /// Imported transactions are rejected before any state changes and before
    /// the store is contacted.
    pub fn request_delete(&mut self, tx: &Transaction) -> Result<(), EngineError> {
        let id = tx.id;
        if !tx.is_mutable() {
            return Err(EngineError::ImportedItemImmutable(id));
        }
        let scope = self.scope.ok_or(EngineError::ViewClosed)?;
        if self.cycles.contains_key(&id) {
            return Err(EngineError::AlreadyPending(id));
        }

        let reservation = self.executor.reserve(id)?;
        self.visibility.begin_animating(id)?;
        self.visibility.set_pending(id)?;

        let generation = self.generation;
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.cycles.insert(
            id,
            Cycle {
                ticket,
                timer_elapsed: false,
                committed: false,
            },
        );
        tracing::debug!(%id, %scope, ticket, "removal started");

        let timer_tx = self.settle_tx.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = timer_tx.send(Settlement {
                generation,
                ticket,
                id,
                signal: Signal::TimerElapsed,
            });
        });

        let mutation_tx = self.settle_tx.clone();
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            let result = reservation.remove().await;
            if result.is_ok() {
                broadcaster.publish(InvalidationEvent::deleted(id, scope));
            }
            let _ = mutation_tx.send(Settlement {
                generation,
                ticket,
                id,
                signal: Signal::Mutation(result),
            });
        });

        Ok(())
    }

    /// Apply every settlement that already arrived, without waiting.
    pub fn resolve_ready(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Ok(settlement) = self.settle_rx.try_recv() {
            resolutions.extend(self.apply(settlement));
        }
        resolutions
    }

    /// Wait for the next settlement that changes this view.
    ///
    /// Returns `None` when no removal of the current view is in flight.
    pub async fn resolve_next(&mut self) -> Option<Resolution> {
        loop {
            if self.cycles.is_empty() {
                return None;
            }
            let settlement = self.settle_rx.recv().await?;
            if let Some(resolution) = self.apply(settlement) {
                return Some(resolution);
            }
        }
    }

    fn apply(&mut self, settlement: Settlement) -> Option<Resolution> {
        let Settlement {
            generation,
            ticket,
            id,
            signal,
        } = settlement;

        if generation != self.generation || self.scope.is_none() {
            tracing::debug!(%id, generation, "dropping settlement of a closed view");
            return None;
        }
        // No matching cycle: rolled back already, or the timer of an earlier attempt.
        let Some(cycle) = self.cycles.get_mut(&id).filter(|cycle| cycle.ticket == ticket) else {
            tracing::debug!(%id, ticket, "dropping settlement of a finished cycle");
            return None;
        };

        match signal {
            Signal::TimerElapsed => {
                if cycle.committed {
                    self.cycles.remove(&id);
                    self.hide(id);
                    Some(Resolution::Hidden(id))
                } else {
                    cycle.timer_elapsed = true;
                    Some(Resolution::AwaitingCommit(id))
                }
            }
            Signal::Mutation(Ok(())) => {
                if cycle.timer_elapsed {
                    self.cycles.remove(&id);
                    self.hide(id);
                    Some(Resolution::Hidden(id))
                } else {
                    cycle.committed = true;
                    self.visibility.release_pending(id);
                    Some(Resolution::Committed(id))
                }
            }
            Signal::Mutation(Err(err)) => {
                self.cycles.remove(&id);
                report_inconsistency(self.visibility.revert(id));
                tracing::warn!(%id, "removal rolled back: {}", err.cause);
                Some(Resolution::RolledBack(err))
            }
        }
    }

    fn hide(&mut self, id: TransactionId) {
        report_inconsistency(self.visibility.commit_hidden(id));
    }
}

/// Transition failures here are programming errors: loud in debug builds,
/// logged and skipped in release builds.
fn report_inconsistency(result: Result<(), EngineError>) {
    if let Err(err) = result {
        tracing::error!("inconsistent row state: {err}");
        debug_assert!(false, "inconsistent row state: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{InMemoryStore, Money, TransactionKind};

    fn expense(n: u128, minor: i64) -> Transaction {
        Transaction::manual(
            TransactionId::from_uuid(uuid::Uuid::from_u128(n)),
            TransactionKind::Expense,
            Money::new(minor),
        )
    }

    fn coordinator(store: InMemoryStore) -> RemovalCoordinator<InMemoryStore> {
        let executor = MutationExecutor::new(Arc::new(store));
        RemovalCoordinator::new(executor, InvalidationBroadcaster::new())
    }

    fn scope() -> MonthScope {
        MonthScope::new(2, 2026).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn closed_view_rejects_requests() {
        let tx = expense(1, 5000);
        let mut coordinator = coordinator(InMemoryStore::new(vec![tx.clone()]));
        assert_eq!(coordinator.request_delete(&tx), Err(EngineError::ViewClosed));
        assert_eq!(coordinator.executor().store().remove_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn request_marks_row_animating_and_pending() {
        let tx = expense(1, 5000);
        let mut coordinator = coordinator(InMemoryStore::new(vec![tx.clone()]));
        coordinator.open(scope());

        coordinator.request_delete(&tx).unwrap();
        assert!(coordinator.visibility().is_animating(tx.id));
        assert!(coordinator.visibility().is_pending(tx.id));
        assert_eq!(coordinator.in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_rows_cannot_be_deleted_again() {
        let tx = expense(1, 5000);
        let mut coordinator = coordinator(InMemoryStore::new(vec![tx.clone()]));
        coordinator.open(scope());

        coordinator.request_delete(&tx).unwrap();
        while coordinator.resolve_next().await.is_some() {}
        assert!(coordinator.visibility().is_hidden(tx.id));

        assert!(matches!(
            coordinator.request_delete(&tx),
            Err(EngineError::InvalidTransition { .. })
        ));
        assert!(!coordinator.executor().is_pending(tx.id));
        assert_eq!(coordinator.executor().store().remove_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_ready_does_not_wait() {
        let tx = expense(1, 5000);
        let store = InMemoryStore::new(vec![tx.clone()]).with_latency(Duration::from_millis(50));
        let mut coordinator = coordinator(store);
        coordinator.open(scope());
        coordinator.request_delete(&tx).unwrap();

        assert!(coordinator.resolve_ready().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let resolutions = coordinator.resolve_ready();
        assert_eq!(
            resolutions,
            vec![Resolution::Committed(tx.id), Resolution::Hidden(tx.id)]
        );
    }
}
