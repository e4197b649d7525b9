use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body returned by the backend for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    /// `MANUAL` rows were entered by the user, `IMPORTED` rows came from a
    /// bank connection and are read-only.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Source {
        Manual,
        Imported,
    }

    /// Query of `GET transactions`.
    ///
    /// `month` is zero-based (0 = January).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub month: u8,
        pub year: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        /// Unsigned amount; `kind` carries the direction.
        pub amount_minor: i64,
        pub category: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub source: Source,
        #[serde(default)]
        pub recurring: bool,
        /// Bank-connection item, set on imported rows.
        pub item_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    /// Body of `POST expenses`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount_minor: i64,
        pub category: Option<String>,
        pub description: Option<String>,
        pub date: NaiveDate,
        pub recurring: bool,
    }

    /// Body of `POST incomes`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub amount_minor: i64,
        pub category: Option<String>,
        pub description: Option<String>,
        pub date: NaiveDate,
    }
}

pub mod bank {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankConnectionView {
        /// Item id referenced by imported transactions.
        pub id: String,
        pub name: String,
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankConnectionsResponse {
        pub connections: Vec<BankConnectionView>,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::*;

    #[test]
    fn transaction_view_accepts_backend_payload() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "kind": "expense",
            "amount_minor": 5000,
            "category": "Alimentação",
            "description": null,
            "date": "2026-03-10",
            "source": "IMPORTED",
            "item_id": "item-1"
        }"#;
        let view: TransactionView = serde_json::from_str(json).unwrap();
        assert_eq!(view.kind, TransactionKind::Expense);
        assert_eq!(view.source, Source::Imported);
        assert!(!view.recurring);
        assert_eq!(view.item_id.as_deref(), Some("item-1"));
    }
}
