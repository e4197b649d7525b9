//! The store the dashboard talks to: the REST backend, or sample data.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use engine::{
    BankConnection, InMemoryStore, Money, MonthScope, NewTransaction, Origin, StoreError,
    Transaction, TransactionId, TransactionKind, TransactionStore,
};

use crate::{client::Client, config::AppConfig, error::Result};

/// Simulated round trip of the demo store; longer than the removal transition
/// so the spinner is visible.
const DEMO_LATENCY: Duration = Duration::from_millis(600);

#[derive(Debug)]
pub enum Backend {
    Http(Client),
    Demo(InMemoryStore),
}

impl Backend {
    pub fn from_config(config: &AppConfig, today: NaiveDate) -> Result<Self> {
        if config.demo {
            return Ok(Self::demo(today));
        }
        Ok(Self::Http(Client::new(
            &config.base_url,
            config.api_token.clone(),
        )?))
    }

    pub fn demo(today: NaiveDate) -> Self {
        let store = InMemoryStore::new(demo_transactions(today))
            .with_latency(DEMO_LATENCY)
            .with_bank_connections(vec![BankConnection {
                id: "demo-item".to_string(),
                name: "Banco Demo".to_string(),
                image_url: None,
            }]);
        Self::Demo(store)
    }
}

impl TransactionStore for Backend {
    async fn list(&self, scope: MonthScope) -> std::result::Result<Vec<Transaction>, StoreError> {
        match self {
            Self::Http(client) => client.list(scope).await,
            Self::Demo(store) => store.list(scope).await,
        }
    }

    async fn remove(&self, id: TransactionId) -> std::result::Result<(), StoreError> {
        match self {
            Self::Http(client) => client.remove(id).await,
            Self::Demo(store) => store.remove(id).await,
        }
    }

    async fn create(&self, new: NewTransaction) -> std::result::Result<TransactionId, StoreError> {
        match self {
            Self::Http(client) => client.create(new).await,
            Self::Demo(store) => store.create(new).await,
        }
    }

    async fn bank_connections(&self) -> std::result::Result<Vec<BankConnection>, StoreError> {
        match self {
            Self::Http(client) => client.bank_connections().await,
            Self::Demo(store) => store.bank_connections().await,
        }
    }
}

fn demo_transactions(today: NaiveDate) -> Vec<Transaction> {
    let day = |d: u32| today.with_day(d.min(today.day())).or(Some(today));
    let rows = [
        (TransactionKind::Income, 850_000, "Salário", "Salary", Origin::Manual, 1),
        (TransactionKind::Expense, 180_000, "Aluguel", "Rent", Origin::Manual, 2),
        (TransactionKind::Expense, 12_490, "Alimentação", "Groceries", Origin::Imported, 3),
        (TransactionKind::Expense, 4_590, "Transporte", "Ride home", Origin::Manual, 4),
        (TransactionKind::Expense, 8_900, "Lazer", "Cinema", Origin::Manual, 5),
        (TransactionKind::Expense, 32_000, "Saúde", "Pharmacy", Origin::Imported, 6),
        (TransactionKind::Income, 45_000, "Outros", "Freelance", Origin::Manual, 7),
    ];

    rows.into_iter()
        .map(|(kind, minor, category, description, origin, d)| Transaction {
            id: TransactionId::new(),
            kind,
            amount: Money::new(minor),
            category: Some(category.to_string()),
            description: Some(description.to_string()),
            occurred_on: day(d),
            origin,
            recurring: category == "Aluguel",
            item_id: (origin == Origin::Imported).then(|| "demo-item".to_string()),
        })
        .collect()
}
