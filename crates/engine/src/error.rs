//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidTransition`] thrown when a visibility transition is attempted from
//!   an inconsistent state. This is a programming error.
//! - [`AlreadyPending`] thrown when a second change for the same transaction is
//!   requested while the first one is still in flight.
//! - [`ImportedItemImmutable`] thrown when the user tries to change a transaction
//!   that was imported from a bank connection.
//! - [`Mutation`] thrown when the remote store refused to commit a change.
//!
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`AlreadyPending`]: EngineError::AlreadyPending
//!  [`ImportedItemImmutable`]: EngineError::ImportedItemImmutable
//!  [`Mutation`]: EngineError::Mutation
use std::fmt;

use thiserror::Error;

use crate::{StoreError, TransactionId};

/// Visibility transitions a transaction row can go through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    BeginAnimating,
    CommitHidden,
    Revert,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BeginAnimating => "begin animating",
            Self::CommitHidden => "commit hidden",
            Self::Revert => "revert",
        };
        f.write_str(label)
    }
}

/// A remote commit that failed.
///
/// Carries the transaction id so the caller can roll back exactly the row it
/// optimistically changed.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("failed to commit change to transaction {id}: {cause}")]
pub struct MutationError {
    pub id: TransactionId,
    pub cause: StoreError,
}

/// Engine custom errors.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("cannot {transition} transaction {id}")]
    InvalidTransition {
        id: TransactionId,
        transition: Transition,
    },
    #[error("a change to transaction {0} is already pending")]
    AlreadyPending(TransactionId),
    #[error("transaction {0} was imported and is read-only")]
    ImportedItemImmutable(TransactionId),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("the list view is closed")]
    ViewClosed,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid scope: {0}")]
    InvalidScope(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub(crate) fn invalid_transition(id: TransactionId, transition: Transition) -> Self {
        Self::InvalidTransition { id, transition }
    }
}
