//! Monthly totals widget and month report state.
//!
//! Aggregates are computed from the store, never from a list view, and cached
//! per month. Invalidation events mark a month stale; the next tick reloads it.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};

use engine::{
    InvalidationBroadcaster, Money, MonthScope, StoreError, Subscription, Transaction,
    TransactionKind, TransactionStore,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub expenses: Money,
    pub income: Money,
}

impl Totals {
    pub fn balance(&self) -> Money {
        self.income - self.expenses
    }
}

/// One category line of the month report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Option<String>,
    pub total: Money,
}

impl CategoryTotal {
    /// Whole percent of `whole`; zero when there is nothing to compare with.
    pub fn percent_of(&self, whole: Money) -> u8 {
        if whole <= Money::ZERO {
            return 0;
        }
        let percent = i128::from(self.total.minor()) * 100 / i128::from(whole.minor());
        percent.clamp(0, 100) as u8
    }
}

/// Totals of a month broken down by category, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthReport {
    pub totals: Totals,
    pub expenses: Vec<CategoryTotal>,
    pub income: Vec<CategoryTotal>,
}

impl MonthReport {
    fn from_rows(rows: &[Transaction]) -> Self {
        let mut totals = Totals::default();
        let mut expenses: BTreeMap<Option<&str>, Money> = BTreeMap::new();
        let mut income: BTreeMap<Option<&str>, Money> = BTreeMap::new();

        for tx in rows {
            let category = tx
                .category
                .as_deref()
                .map(str::trim)
                .filter(|category| !category.is_empty());
            let (total, by_category) = match tx.kind {
                TransactionKind::Expense => (&mut totals.expenses, &mut expenses),
                TransactionKind::Income => (&mut totals.income, &mut income),
            };
            *total += tx.amount;
            *by_category.entry(category).or_default() += tx.amount;
        }

        Self {
            totals,
            expenses: ranked(expenses),
            income: ranked(income),
        }
    }
}

fn ranked(by_category: BTreeMap<Option<&str>, Money>) -> Vec<CategoryTotal> {
    let mut lines: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.map(str::to_string),
            total,
        })
        .collect();
    lines.sort_by(|a, b| b.total.cmp(&a.total));
    lines
}

#[derive(Debug)]
pub struct MonthlyTotals {
    cache: HashMap<MonthScope, MonthReport>,
    /// Months whose last load failed; retried on the next event or `retry`.
    failed: HashSet<MonthScope>,
    stale: Arc<Mutex<HashSet<MonthScope>>>,
    _subscription: Subscription,
}

impl MonthlyTotals {
    pub fn new(broadcaster: &InvalidationBroadcaster) -> Self {
        let stale: Arc<Mutex<HashSet<MonthScope>>> = Arc::default();
        let subscription = {
            let stale = Arc::clone(&stale);
            broadcaster.subscribe(move |event| {
                stale
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(event.scope);
            })
        };
        Self {
            cache: HashMap::new(),
            failed: HashSet::new(),
            stale,
            _subscription: subscription,
        }
    }

    pub fn get(&self, scope: MonthScope) -> Option<Totals> {
        self.cache.get(&scope).map(|report| report.totals)
    }

    pub fn report(&self, scope: MonthScope) -> Option<&MonthReport> {
        self.cache.get(&scope)
    }

    pub fn needs_refresh(&self, scope: MonthScope) -> bool {
        (!self.cache.contains_key(&scope) && !self.failed.contains(&scope))
            || self
                .stale
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&scope)
    }

    pub fn retry(&mut self, scope: MonthScope) {
        self.failed.remove(&scope);
    }

    pub async fn refresh<S: TransactionStore>(
        &mut self,
        store: &S,
        scope: MonthScope,
    ) -> Result<Totals, StoreError> {
        // Cleared first: an event arriving during the load marks it stale again.
        self.stale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&scope);

        let rows = match store.list(scope).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(%scope, "failed to load totals: {err}");
                self.failed.insert(scope);
                return Err(err);
            }
        };
        let report = MonthReport::from_rows(&rows);
        let totals = report.totals;
        tracing::debug!(
            %scope,
            expenses = %totals.expenses,
            income = %totals.income,
            "totals refreshed"
        );
        self.failed.remove(&scope);
        self.cache.insert(scope, report);
        Ok(totals)
    }
}
