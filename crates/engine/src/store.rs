//! Seam towards the remote source of truth.
//!
//! The engine never caches store contents beyond the read-only snapshot a list
//! view loads; every write goes through [`TransactionStore`].

use std::future::Future;

use thiserror::Error;

use crate::{BankConnection, MonthScope, NewTransaction, Transaction, TransactionId};

/// Failures reported by a store.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Data-access collaborator backing the dashboard.
///
/// Futures must be `Send`: removals run on spawned tasks.
pub trait TransactionStore: Send + Sync + 'static {
    /// Transactions of one month, in display order.
    fn list(
        &self,
        scope: MonthScope,
    ) -> impl Future<Output = Result<Vec<Transaction>, StoreError>> + Send;

    fn remove(&self, id: TransactionId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn create(
        &self,
        new: NewTransaction,
    ) -> impl Future<Output = Result<TransactionId, StoreError>> + Send;

    /// Connected banks, used for row iconography only.
    fn bank_connections(
        &self,
    ) -> impl Future<Output = Result<Vec<BankConnection>, StoreError>> + Send {
        async { Ok(Vec::new()) }
    }
}
