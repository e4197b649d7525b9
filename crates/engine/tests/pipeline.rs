use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::NaiveDate;
use uuid::Uuid;

use engine::{
    EngineError, InMemoryStore, InvalidationBroadcaster, InvalidationEvent, ListView, Money,
    MonthScope, MutationExecutor, Origin, RemovalCoordinator, Resolution, StoreError,
    Subscription, Transaction, TransactionId, TransactionKind, VisibilityState,
};

const LATENCY_BEFORE_TIMER: Duration = Duration::from_millis(100);
const LATENCY_AFTER_TIMER: Duration = Duration::from_millis(800);

fn march() -> MonthScope {
    MonthScope::new(2, 2026).unwrap()
}

fn id(n: u128) -> TransactionId {
    TransactionId::from_uuid(Uuid::from_u128(n))
}

fn expense(n: u128, minor: i64, origin: Origin) -> Transaction {
    let mut tx = Transaction::manual(id(n), TransactionKind::Expense, Money::new(minor));
    tx.origin = origin;
    tx.occurred_on = NaiveDate::from_ymd_opt(2026, 3, 10);
    if origin == Origin::Imported {
        tx.item_id = Some("item-1".to_string());
    }
    tx
}

/// id 1: 50.00 manual, id 2: 30.00 imported.
fn fixture() -> Vec<Transaction> {
    vec![
        expense(1, 5000, Origin::Manual),
        expense(2, 3000, Origin::Imported),
    ]
}

struct Harness {
    view: ListView<InMemoryStore>,
    store: Arc<InMemoryStore>,
    events: Arc<Mutex<Vec<InvalidationEvent>>>,
    _subscription: Subscription,
}

impl Harness {
    async fn open(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        let broadcaster = InvalidationBroadcaster::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let events = Arc::clone(&events);
            broadcaster.subscribe(move |event| events.lock().unwrap().push(*event))
        };

        let executor = MutationExecutor::new(Arc::clone(&store));
        let mut view = ListView::new(
            RemovalCoordinator::new(executor, broadcaster),
            TransactionKind::Expense,
        );
        view.open(march()).await.unwrap();

        Self {
            view,
            store,
            events,
            _subscription: subscription,
        }
    }

    fn rendered(&self) -> Vec<TransactionId> {
        self.view
            .projection()
            .rows
            .iter()
            .map(|row| row.transaction.id)
            .collect()
    }

    fn total(&self) -> Money {
        self.view.projection().total
    }

    fn events(&self) -> Vec<InvalidationEvent> {
        self.events.lock().unwrap().clone()
    }

    async fn settle(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Some(resolution) = self.view.resolve_next().await {
            resolutions.push(resolution);
        }
        resolutions
    }
}

#[tokio::test(start_paused = true)]
async fn deleting_an_imported_row_is_rejected_without_side_effects() {
    let mut h = Harness::open(InMemoryStore::new(fixture())).await;
    assert_eq!(h.total(), Money::new(8000));

    assert_eq!(
        h.view.delete(id(2)),
        Err(EngineError::ImportedItemImmutable(id(2)))
    );

    assert_eq!(h.rendered(), vec![id(1), id(2)]);
    assert_eq!(h.total(), Money::new(8000));
    assert!(h.view.coordinator().visibility().is_empty());
    assert!(!h.view.is_animating());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(h.view.resolve_ready().is_empty());
    assert_eq!(h.store.remove_calls(), 0);
    assert!(h.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn successful_delete_hides_the_row_and_broadcasts_once() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_BEFORE_TIMER);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    assert!(h.view.is_animating());
    assert_eq!(h.rendered(), vec![id(1), id(2)]);
    assert_eq!(h.total(), Money::new(8000));

    assert_eq!(
        h.settle().await,
        vec![Resolution::Committed(id(1)), Resolution::Hidden(id(1))]
    );

    assert_eq!(h.rendered(), vec![id(2)]);
    assert_eq!(h.total(), Money::new(3000));
    assert!(!h.view.is_animating());
    assert_eq!(h.events(), vec![InvalidationEvent::deleted(id(1), march())]);
    assert!(!h.store.contains(id(1)));
}

#[tokio::test(start_paused = true)]
async fn only_manual_row_deleted_leaves_an_empty_list() {
    let store = InMemoryStore::new(vec![expense(1, 5000, Origin::Manual)]);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    h.settle().await;

    assert!(h.rendered().is_empty());
    assert_eq!(h.total(), Money::ZERO);
    let events = h.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, id(1));
    assert_eq!(events[0].scope.month(), 2);
    assert_eq!(events[0].scope.year(), 2026);
}

#[tokio::test(start_paused = true)]
async fn failure_after_the_timer_restores_the_row() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_AFTER_TIMER);
    store.fail_removals_of(id(1));
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    let resolutions = h.settle().await;

    assert_eq!(resolutions.len(), 2);
    assert_eq!(resolutions[0], Resolution::AwaitingCommit(id(1)));
    match &resolutions[1] {
        Resolution::RolledBack(err) => {
            assert_eq!(err.id, id(1));
            assert!(matches!(err.cause, StoreError::Server(_)));
        }
        other => panic!("unexpected resolution: {other:?}"),
    }

    assert_eq!(h.rendered(), vec![id(1), id(2)]);
    let row = h.view.projection().rows[0];
    assert_eq!(row.transaction.amount, Money::new(5000));
    assert!(!row.is_animating);
    assert!(row.deletable);
    assert_eq!(h.total(), Money::new(8000));
    assert!(h.events().is_empty());
    assert!(h.view.coordinator().visibility().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failure_before_the_timer_restores_the_row() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_BEFORE_TIMER);
    store.fail_removals_of(id(1));
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    let resolutions = h.settle().await;
    assert!(matches!(
        resolutions.as_slice(),
        [Resolution::RolledBack(err)] if err.id == id(1)
    ));

    // The timer of the failed attempt still fires; it must not touch the row.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(h.view.resolve_ready().is_empty());
    assert_eq!(h.rendered(), vec![id(1), id(2)]);
    assert_eq!(h.total(), Money::new(8000));
    assert!(h.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_delete_while_pending_is_rejected() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_AFTER_TIMER);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    assert_eq!(h.view.delete(id(1)), Err(EngineError::AlreadyPending(id(1))));

    h.settle().await;
    assert_eq!(h.store.remove_calls(), 1);
    assert_eq!(h.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_after_rollback_waits_for_its_own_timer() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_BEFORE_TIMER);
    store.fail_removals_of(id(1));
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    h.settle().await;
    h.store.heal(id(1));

    // Retry at t=100ms: the first attempt's timer fires at t=300ms.
    h.view.delete(id(1)).unwrap();
    assert_eq!(
        h.settle().await,
        vec![Resolution::Committed(id(1)), Resolution::Hidden(id(1))]
    );
    assert_eq!(h.rendered(), vec![id(2)]);
    assert_eq!(h.store.remove_calls(), 2);
    assert_eq!(h.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_discards_state_but_not_the_remote_removal() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_AFTER_TIMER);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    h.view.close();
    h.view.close();
    assert!(!h.view.is_open());
    assert_eq!(h.view.coordinator().visibility(), &VisibilityState::new());

    h.view.open(march()).await.unwrap();
    assert_eq!(h.view.coordinator().visibility(), &VisibilityState::new());
    assert_eq!(h.view.coordinator().in_flight(), 0);
    // The store still has the earlier removal in flight.
    assert_eq!(h.view.delete(id(1)), Err(EngineError::AlreadyPending(id(1))));
    assert!(h.view.coordinator().visibility().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(h.view.resolve_ready().is_empty());
    assert_eq!(h.view.resolve_next().await, None);
    assert_eq!(h.view.coordinator().visibility(), &VisibilityState::new());

    // Other surfaces still learn about the committed removal.
    assert_eq!(h.events(), vec![InvalidationEvent::deleted(id(1), march())]);
    assert_eq!(h.store.remove_calls(), 1);

    h.view.refresh().await.unwrap();
    assert_eq!(h.rendered(), vec![id(2)]);
}

#[tokio::test(start_paused = true)]
async fn total_matches_rendered_rows_mid_animation() {
    let rows = vec![
        expense(1, 5000, Origin::Manual),
        expense(2, 3000, Origin::Imported),
        expense(3, 1250, Origin::Manual),
        expense(4, 999, Origin::Manual),
    ];
    let store = InMemoryStore::new(rows).with_latency(LATENCY_BEFORE_TIMER);
    store.fail_removals_of(id(4));
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    h.view.delete(id(3)).unwrap();
    h.view.delete(id(4)).unwrap();

    let check = |view: &ListView<InMemoryStore>| {
        let projection = view.projection();
        let sum: Money = projection.rows.iter().map(|row| row.transaction.amount).sum();
        assert_eq!(projection.total, sum);
    };

    check(&h.view);
    while let Some(_resolution) = h.view.resolve_next().await {
        check(&h.view);
    }

    assert_eq!(h.rendered(), vec![id(2), id(4)]);
    assert_eq!(h.total(), Money::new(3999));
    assert_eq!(h.events().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn switching_month_drops_settlements_of_the_old_scope() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_AFTER_TIMER);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    let april = march().next();
    h.view.open(april).await.unwrap();
    assert!(h.rendered().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(h.view.resolve_ready().is_empty());
    assert_eq!(h.events(), vec![InvalidationEvent::deleted(id(1), march())]);
}

#[tokio::test(start_paused = true)]
async fn overlapping_deletes_keep_earlier_rows_disabled() {
    let mut rows = fixture();
    rows.push(expense(3, 1250, Origin::Manual));
    let store = InMemoryStore::new(rows).with_latency(LATENCY_AFTER_TIMER);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    h.view.delete(id(3)).unwrap();

    let projection = h.view.projection();
    let first = projection.rows[0];
    assert_eq!(first.transaction.id, id(1));
    assert!(first.is_animating);
    assert!(!first.is_pending);
    assert!(!first.deletable);
    assert_eq!(h.view.delete(id(1)), Err(EngineError::AlreadyPending(id(1))));

    h.settle().await;
    assert_eq!(h.rendered(), vec![id(2)]);
    assert_eq!(h.store.remove_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn spinner_runs_until_the_committed_row_is_hidden() {
    let store = InMemoryStore::new(fixture()).with_latency(LATENCY_BEFORE_TIMER);
    let mut h = Harness::open(store).await;

    h.view.delete(id(1)).unwrap();
    assert_eq!(h.view.resolve_next().await, Some(Resolution::Committed(id(1))));
    assert_eq!(h.view.coordinator().visibility().pending(), None);
    assert!(h.view.is_animating());
    assert!(!h.view.projection().rows[0].deletable);

    assert_eq!(h.view.resolve_next().await, Some(Resolution::Hidden(id(1))));
    assert!(!h.view.is_animating());
}
