//! Per-row overlay on top of a transaction snapshot.
//!
//! A row is `Visible` until a removal starts, `Animating` while the removal
//! transition plays and the remote commit is outstanding, and `Hidden` once
//! both completed. A failed commit moves it back to `Visible`.
//!
//! Invariants:
//! - `hidden` and `animating` never share an id.
//! - `pending`, when set, is one of the `animating` ids.

use std::collections::HashSet;

use crate::{EngineError, ResultEngine, TransactionId, error::Transition};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VisibilityState {
    hidden: HashSet<TransactionId>,
    animating: HashSet<TransactionId>,
    pending: Option<TransactionId>,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_animating(&mut self, id: TransactionId) -> ResultEngine<()> {
        if self.animating.contains(&id) || self.hidden.contains(&id) {
            return Err(EngineError::invalid_transition(id, Transition::BeginAnimating));
        }
        self.animating.insert(id);
        Ok(())
    }

    pub fn commit_hidden(&mut self, id: TransactionId) -> ResultEngine<()> {
        if !self.animating.remove(&id) {
            return Err(EngineError::invalid_transition(id, Transition::CommitHidden));
        }
        self.release_pending(id);
        self.hidden.insert(id);
        Ok(())
    }

    /// Abort an animation; the row becomes visible again.
    pub fn revert(&mut self, id: TransactionId) -> ResultEngine<()> {
        if !self.animating.remove(&id) {
            return Err(EngineError::invalid_transition(id, Transition::Revert));
        }
        self.release_pending(id);
        Ok(())
    }

    /// Drop every overlay. Only used when the view is torn down.
    pub fn reset(&mut self) {
        self.hidden.clear();
        self.animating.clear();
        self.pending = None;
    }

    /// Mark `id` as the row showing the in-flight spinner.
    pub fn set_pending(&mut self, id: TransactionId) -> ResultEngine<()> {
        if !self.animating.contains(&id) {
            return Err(EngineError::invalid_transition(id, Transition::BeginAnimating));
        }
        self.pending = Some(id);
        Ok(())
    }

    /// Clear the spinner if it belongs to `id`.
    pub fn release_pending(&mut self, id: TransactionId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    pub fn pending(&self) -> Option<TransactionId> {
        self.pending
    }

    pub fn is_pending(&self, id: TransactionId) -> bool {
        self.pending == Some(id)
    }

    pub fn is_hidden(&self, id: TransactionId) -> bool {
        self.hidden.contains(&id)
    }

    pub fn is_animating(&self, id: TransactionId) -> bool {
        self.animating.contains(&id)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn animating_count(&self) -> usize {
        self.animating.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty() && self.animating.is_empty() && self.pending.is_none()
    }
}
