//! Transaction primitives.
//!
//! The engine never owns transactions: they are read from the remote store as
//! a month-scoped snapshot and only referenced by id afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

/// Stable identifier of a transaction, as assigned by the remote store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for TransactionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<TransactionId> for Uuid {
    fn from(value: TransactionId) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Expense => "Expense",
            Self::Income => "Income",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(EngineError::KeyNotFound(other.to_string())),
        }
    }
}

/// Where a transaction came from.
///
/// Only `Manual` transactions can be changed by the user; `Imported` ones were
/// ingested from a bank connection and are display-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Origin {
    Manual,
    Imported,
}

impl Origin {
    pub fn is_mutable(self) -> bool {
        self == Self::Manual
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Magnitude of the transaction; `kind` carries the direction.
    pub amount: Money,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_on: Option<NaiveDate>,
    pub origin: Origin,
    /// Recurring expenses are flagged with a badge in the list.
    pub recurring: bool,
    /// Bank-connection item this transaction was imported through.
    pub item_id: Option<String>,
}

impl Transaction {
    /// A manual expense with no display attributes.
    pub fn manual(id: TransactionId, kind: TransactionKind, amount: Money) -> Self {
        Self {
            id,
            kind,
            amount,
            category: None,
            description: None,
            occurred_on: None,
            origin: Origin::Manual,
            recurring: false,
            item_id: None,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.origin.is_mutable()
    }
}

/// Body of a create mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub recurring: bool,
}

impl NewTransaction {
    /// Materialise the created transaction once the store assigned an id.
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            occurred_on: Some(self.occurred_on),
            origin: Origin::Manual,
            recurring: self.recurring,
            item_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_uses_backend_spelling() {
        assert_eq!(serde_json::to_string(&Origin::Manual).unwrap(), "\"MANUAL\"");
        let origin: Origin = serde_json::from_str("\"IMPORTED\"").unwrap();
        assert_eq!(origin, Origin::Imported);
        assert!(!origin.is_mutable());
    }

    #[test]
    fn created_transactions_are_manual() {
        let new = NewTransaction {
            kind: TransactionKind::Expense,
            amount: Money::new(4590),
            category: Some("Transporte".to_string()),
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            recurring: true,
        };
        let id = TransactionId::new();
        let tx = new.into_transaction(id);
        assert_eq!(tx.id, id);
        assert!(tx.is_mutable());
        assert!(tx.recurring);
        assert_eq!(tx.item_id, None);
    }

    #[test]
    fn kind_round_trips_through_its_name() {
        for kind in [TransactionKind::Expense, TransactionKind::Income] {
            assert_eq!(TransactionKind::try_from(kind.as_str()), Ok(kind));
        }
        assert!(TransactionKind::try_from("refund").is_err());
    }
}
