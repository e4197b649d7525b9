use api_types::{
    ErrorResponse,
    bank::BankConnectionsResponse,
    transaction::{
        ExpenseNew, IncomeNew, Source, TransactionCreated, TransactionKind as WireKind,
        TransactionList, TransactionListResponse, TransactionView,
    },
};
use engine::{
    BankConnection, Money, MonthScope, NewTransaction, Origin, StoreError, Transaction,
    TransactionId, TransactionKind, TransactionStore,
};
use reqwest::{RequestBuilder, Response, Url};

use crate::error::{AppError, Result};

/// REST client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|err| {
            AppError::Config(config::ConfigError::Message(format!("invalid base_url: {err}")))
        })?;
        // `Url::join` replaces the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            token,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|err| StoreError::Server(format!("invalid base_url: {err}")))
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, StoreError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let res = request.send().await.map_err(transport)?;
        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(error_for_status(status.as_u16(), body))
    }
}

impl TransactionStore for Client {
    async fn list(&self, scope: MonthScope) -> std::result::Result<Vec<Transaction>, StoreError> {
        let endpoint = self.endpoint("transactions")?;
        let query = TransactionList {
            month: scope.month(),
            year: scope.year(),
        };
        let res = self.send(self.http.get(endpoint).query(&query)).await?;
        let body = res
            .json::<TransactionListResponse>()
            .await
            .map_err(transport)?;
        Ok(body.transactions.into_iter().map(from_view).collect())
    }

    async fn remove(&self, id: TransactionId) -> std::result::Result<(), StoreError> {
        let endpoint = self.endpoint(&format!("transactions/{id}"))?;
        self.send(self.http.delete(endpoint)).await?;
        Ok(())
    }

    async fn create(&self, new: NewTransaction) -> std::result::Result<TransactionId, StoreError> {
        let request = match new.kind {
            TransactionKind::Expense => {
                let body = ExpenseNew {
                    amount_minor: new.amount.minor(),
                    category: new.category,
                    description: new.description,
                    date: new.occurred_on,
                    recurring: new.recurring,
                };
                self.http.post(self.endpoint("expenses")?).json(&body)
            }
            TransactionKind::Income => {
                let body = IncomeNew {
                    amount_minor: new.amount.minor(),
                    category: new.category,
                    description: new.description,
                    date: new.occurred_on,
                };
                self.http.post(self.endpoint("incomes")?).json(&body)
            }
        };
        let res = self.send(request).await?;
        let created = res.json::<TransactionCreated>().await.map_err(transport)?;
        Ok(TransactionId::from_uuid(created.id))
    }

    async fn bank_connections(&self) -> std::result::Result<Vec<BankConnection>, StoreError> {
        let endpoint = self.endpoint("bank-connections")?;
        let res = self.send(self.http.get(endpoint)).await?;
        let body = res
            .json::<BankConnectionsResponse>()
            .await
            .map_err(transport)?;
        Ok(body
            .connections
            .into_iter()
            .map(|conn| BankConnection {
                id: conn.id,
                name: conn.name,
                image_url: conn.image_url,
            })
            .collect())
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

fn error_for_status(status: u16, body: String) -> StoreError {
    match status {
        401 => StoreError::Unauthorized,
        403 => StoreError::Forbidden,
        404 => StoreError::NotFound,
        409 => StoreError::Conflict(body),
        422 => StoreError::Validation(body),
        _ => StoreError::Server(body),
    }
}

fn from_view(view: TransactionView) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(view.id),
        kind: match view.kind {
            WireKind::Expense => TransactionKind::Expense,
            WireKind::Income => TransactionKind::Income,
        },
        amount: Money::new(view.amount_minor),
        category: view.category,
        description: view.description,
        occurred_on: view.date,
        origin: match view.source {
            Source::Manual => Origin::Manual,
            Source::Imported => Origin::Imported,
        },
        recurring: view.recurring,
        item_id: view.item_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_onto_store_errors() {
        assert_eq!(error_for_status(401, String::new()), StoreError::Unauthorized);
        assert_eq!(error_for_status(403, String::new()), StoreError::Forbidden);
        assert_eq!(error_for_status(404, String::new()), StoreError::NotFound);
        assert_eq!(
            error_for_status(422, "amount".to_string()),
            StoreError::Validation("amount".to_string())
        );
        assert_eq!(
            error_for_status(502, "bad gateway".to_string()),
            StoreError::Server("bad gateway".to_string())
        );
    }

    #[test]
    fn imported_views_keep_their_origin() {
        let view: TransactionView = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000002",
                "kind": "expense",
                "amount_minor": 3000,
                "category": null,
                "description": "PIX Mercado",
                "date": "2026-03-04",
                "source": "IMPORTED",
                "recurring": false,
                "item_id": "item-9"
            }"#,
        )
        .unwrap();

        let tx = from_view(view);
        assert_eq!(tx.origin, Origin::Imported);
        assert!(!tx.is_mutable());
        assert_eq!(tx.amount, Money::new(3000));
        assert_eq!(tx.item_id.as_deref(), Some("item-9"));
    }

    #[test]
    fn endpoints_are_relative_to_the_base_url() {
        let client = Client::new("http://127.0.0.1:3000/api/", None).unwrap();
        let id = TransactionId::from_uuid(uuid::Uuid::from_u128(1));
        assert_eq!(
            client.endpoint(&format!("transactions/{id}")).unwrap().as_str(),
            "http://127.0.0.1:3000/api/transactions/00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let client = Client::new("http://127.0.0.1:3000/api", None).unwrap();
        let id = TransactionId::from_uuid(uuid::Uuid::from_u128(1));
        assert_eq!(
            client.endpoint(&format!("transactions/{id}")).unwrap().as_str(),
            "http://127.0.0.1:3000/api/transactions/00000000-0000-0000-0000-000000000001"
        );

        let root = Client::new("http://127.0.0.1:3000", None).unwrap();
        assert_eq!(
            root.endpoint("transactions").unwrap().as_str(),
            "http://127.0.0.1:3000/transactions"
        );
    }
}
