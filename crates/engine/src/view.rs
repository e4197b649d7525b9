//! A month-scoped list of one kind of transaction, with optimistic removal.

use crate::{
    EngineError, MonthScope, RemovalCoordinator, Resolution, ResultEngine, Transaction,
    TransactionId, TransactionKind, TransactionStore,
    presenter::{self, Projection},
};

#[derive(Debug)]
pub struct ListView<S> {
    kind: TransactionKind,
    coordinator: RemovalCoordinator<S>,
    snapshot: Vec<Transaction>,
}

impl<S: TransactionStore> ListView<S> {
    pub fn new(coordinator: RemovalCoordinator<S>, kind: TransactionKind) -> Self {
        Self {
            kind,
            coordinator,
            snapshot: Vec::new(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn scope(&self) -> Option<MonthScope> {
        self.coordinator.scope()
    }

    pub fn is_open(&self) -> bool {
        self.coordinator.is_open()
    }

    pub fn coordinator(&self) -> &RemovalCoordinator<S> {
        &self.coordinator
    }

    pub fn snapshot(&self) -> &[Transaction] {
        &self.snapshot
    }

    /// Open the view on `scope` with a fresh snapshot.
    ///
    /// Any previous state is discarded first, so reopening behaves like a
    /// first open even while older removals are still settling remotely.
    pub async fn open(&mut self, scope: MonthScope) -> ResultEngine<()> {
        self.coordinator.open(scope);
        self.snapshot.clear();
        self.load(scope).await
    }

    /// Reload the snapshot of the current scope, keeping row overlays.
    pub async fn refresh(&mut self) -> ResultEngine<()> {
        let scope = self.coordinator.scope().ok_or(EngineError::ViewClosed)?;
        self.load(scope).await
    }

    async fn load(&mut self, scope: MonthScope) -> ResultEngine<()> {
        let store = self.coordinator.executor().store();
        let kind = self.kind;
        let mut transactions = store.list(scope).await.inspect_err(|err| {
            tracing::warn!(%scope, kind = kind.as_str(), "failed to load transactions: {err}");
        })?;
        transactions.retain(|tx| tx.kind == kind);

        // The view may have been closed or moved while the list was loading.
        if self.coordinator.scope() == Some(scope) {
            tracing::debug!(%scope, rows = transactions.len(), "snapshot loaded");
            self.snapshot = transactions;
        }
        Ok(())
    }

    /// Discard every local state. Idempotent.
    pub fn close(&mut self) {
        self.coordinator.close();
        self.snapshot.clear();
    }

    pub fn delete(&mut self, id: TransactionId) -> ResultEngine<()> {
        let tx = self
            .snapshot
            .iter()
            .find(|tx| tx.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        self.coordinator.request_delete(tx)
    }

    pub fn projection(&self) -> Projection<'_> {
        presenter::project(&self.snapshot, self.coordinator.visibility())
    }

    /// Whether any removal of this view is still running (the global spinner).
    pub fn is_animating(&self) -> bool {
        self.coordinator.in_flight() > 0
    }

    pub fn resolve_ready(&mut self) -> Vec<Resolution> {
        self.coordinator.resolve_ready()
    }

    pub async fn resolve_next(&mut self) -> Option<Resolution> {
        self.coordinator.resolve_next().await
    }
}
