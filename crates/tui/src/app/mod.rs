pub mod totals;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use engine::{
    BankDirectory, CategoryIcons, Currency, EngineError, InvalidationBroadcaster,
    InvalidationEvent, ListView, MonthScope, MutationExecutor, RemovalCoordinator, Resolution,
    TransactionKind, TransactionStore,
};

use crate::{
    backend::Backend,
    config::AppConfig,
    error::{AppError, Result},
    quick_add::{self, QuickAddKind},
    ui::{
        self,
        keymap::{AppAction, KeyContext},
    },
};

use self::totals::MonthlyTotals;

const TICK_RATE: Duration = Duration::from_millis(50);
const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

impl ToastState {
    fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        }
    }
}

/// The open expenses/income list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListModal {
    pub kind: TransactionKind,
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct QuickAddForm {
    pub kind: QuickAddKind,
    pub input: String,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct AppState {
    pub scope: MonthScope,
    pub today: NaiveDate,
    pub currency: Currency,
    pub expenses: ListView<Backend>,
    pub incomes: ListView<Backend>,
    pub modal: Option<ListModal>,
    pub quick_add: Option<QuickAddForm>,
    pub report_open: bool,
    pub totals: MonthlyTotals,
    pub icons: CategoryIcons,
    pub banks: BankDirectory,
    pub toast: Option<ToastState>,
    pub tick: usize,
}

impl AppState {
    pub fn view(&self, kind: TransactionKind) -> &ListView<Backend> {
        match kind {
            TransactionKind::Expense => &self.expenses,
            TransactionKind::Income => &self.incomes,
        }
    }

    fn view_mut(&mut self, kind: TransactionKind) -> &mut ListView<Backend> {
        match kind {
            TransactionKind::Expense => &mut self.expenses,
            TransactionKind::Income => &mut self.incomes,
        }
    }

    pub fn key_context(&self) -> KeyContext {
        if self.quick_add.is_some() {
            KeyContext::TextInput
        } else if self.modal.is_some() {
            KeyContext::List
        } else if self.report_open {
            KeyContext::Report
        } else {
            KeyContext::Dashboard
        }
    }

    fn notify(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState::new(level, message));
    }
}

pub struct App {
    executor: MutationExecutor<Backend>,
    broadcaster: InvalidationBroadcaster,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub async fn new(config: AppConfig, backend: Backend, today: NaiveDate) -> Result<Self> {
        let store = Arc::new(backend);
        let banks = match store.bank_connections().await {
            Ok(connections) => BankDirectory::new(connections),
            Err(err) => {
                tracing::warn!("failed to load bank connections: {err}");
                BankDirectory::default()
            }
        };

        let executor = MutationExecutor::new(store);
        let broadcaster = InvalidationBroadcaster::new();
        let view = |kind| {
            let coordinator = RemovalCoordinator::new(executor.clone(), broadcaster.clone())
                .with_delay(config.removal_delay());
            ListView::new(coordinator, kind)
        };

        let state = AppState {
            scope: MonthScope::of(today),
            today,
            currency: config.currency,
            expenses: view(TransactionKind::Expense),
            incomes: view(TransactionKind::Income),
            modal: None,
            quick_add: None,
            report_open: false,
            totals: MonthlyTotals::new(&broadcaster),
            icons: CategoryIcons::default().with_overrides(&config.categories),
            banks,
            toast: None,
            tick: 0,
        };

        Ok(Self {
            executor,
            broadcaster,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        while !self.should_quit {
            self.on_tick().await;

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Apply settled removals, reload stale totals and expire the toast.
    pub(crate) async fn on_tick(&mut self) {
        self.state.tick = self.state.tick.wrapping_add(1);

        for kind in [TransactionKind::Expense, TransactionKind::Income] {
            let resolutions = self.state.view_mut(kind).resolve_ready();
            for resolution in resolutions {
                self.on_resolution(kind, resolution);
            }
        }

        let scope = self.state.scope;
        if self.state.totals.needs_refresh(scope) {
            let store = Arc::clone(self.executor.store());
            if let Err(err) = self.state.totals.refresh(store.as_ref(), scope).await {
                self.state
                    .notify(ToastLevel::Error, format!("Could not load totals: {err}"));
            }
        }

        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }

    fn on_resolution(&mut self, kind: TransactionKind, resolution: Resolution) {
        match resolution {
            Resolution::RolledBack(err) => {
                self.state.notify(
                    ToastLevel::Error,
                    format!("Could not delete the {}: {}", noun(kind), err.cause),
                );
            }
            Resolution::Hidden(_) => {
                let len = self.state.view(kind).projection().len();
                if let Some(modal) = self.state.modal.as_mut().filter(|m| m.kind == kind) {
                    modal.selected = modal.selected.min(len.saturating_sub(1));
                }
            }
            Resolution::Committed(_) | Resolution::AwaitingCommit(_) => {}
        }
    }

    pub(crate) async fn handle_key(&mut self, key: KeyEvent) {
        let action = ui::keymap::map_key(key, self.state.key_context());
        match action {
            AppAction::Quit => self.should_quit = true,
            AppAction::PrevMonth => self.change_month(self.state.scope.prev()),
            AppAction::NextMonth => self.change_month(self.state.scope.next()),
            AppAction::AddExpense => self.start_quick_add(QuickAddKind::Expense),
            AppAction::AddIncome => self.start_quick_add(QuickAddKind::Income),
            AppAction::AddRecurring => self.start_quick_add(QuickAddKind::RecurringExpense),
            AppAction::OpenExpenses => self.open_list(TransactionKind::Expense).await,
            AppAction::OpenIncomes => self.open_list(TransactionKind::Income).await,
            AppAction::OpenReport => self.open_report(),
            AppAction::Up => self.move_selection(-1),
            AppAction::Down => self.move_selection(1),
            AppAction::Delete => self.delete_selected(),
            AppAction::Cancel => self.cancel(),
            AppAction::Submit => self.submit_quick_add().await,
            AppAction::Backspace => {
                if let Some(form) = self.state.quick_add.as_mut() {
                    form.input.pop();
                }
            }
            AppAction::Input(ch) => {
                if let Some(form) = self.state.quick_add.as_mut() {
                    form.input.push(ch);
                    form.error = None;
                }
            }
            AppAction::None => {}
        }
    }

    fn change_month(&mut self, scope: MonthScope) {
        self.state.scope = scope;
        self.state.totals.retry(scope);
        tracing::debug!(%scope, "month selected");
    }

    fn open_report(&mut self) {
        self.state.report_open = true;
        self.state.totals.retry(self.state.scope);
    }

    fn start_quick_add(&mut self, kind: QuickAddKind) {
        self.state.quick_add = Some(QuickAddForm {
            kind,
            input: String::new(),
            error: None,
        });
    }

    async fn open_list(&mut self, kind: TransactionKind) {
        let scope = self.state.scope;
        let view = self.state.view_mut(kind);
        match view.open(scope).await {
            Ok(()) => {
                self.state.modal = Some(ListModal { kind, selected: 0 });
            }
            Err(err) => {
                view.close();
                self.state
                    .notify(ToastLevel::Error, format!("Could not load {}s: {err}", noun(kind)));
            }
        }
    }

    fn cancel(&mut self) {
        if self.state.quick_add.take().is_some() {
            return;
        }
        if let Some(modal) = self.state.modal.take() {
            self.state.view_mut(modal.kind).close();
            return;
        }
        self.state.report_open = false;
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(modal) = self.state.modal else {
            return;
        };
        let len = self.state.view(modal.kind).projection().len();
        if len == 0 {
            return;
        }
        let selected = modal.selected.saturating_add_signed(delta).min(len - 1);
        self.state.modal = Some(ListModal { selected, ..modal });
    }

    fn delete_selected(&mut self) {
        let Some(modal) = self.state.modal else {
            return;
        };
        let view = self.state.view_mut(modal.kind);
        let Some(id) = view
            .projection()
            .rows
            .get(modal.selected)
            .map(|row| row.transaction.id)
        else {
            return;
        };

        match view.delete(id) {
            Ok(()) => {}
            Err(EngineError::ImportedItemImmutable(_)) => {
                self.state.notify(
                    ToastLevel::Info,
                    "Imported from Open Finance: this entry cannot be deleted",
                );
            }
            // The control is disabled while a removal runs.
            Err(EngineError::AlreadyPending(id) | EngineError::InvalidTransition { id, .. }) => {
                tracing::debug!(%id, "delete ignored while pending");
            }
            Err(err) => {
                self.state.notify(ToastLevel::Error, err.to_string());
            }
        }
    }

    async fn submit_quick_add(&mut self) {
        let Some(form) = self.state.quick_add.as_mut() else {
            return;
        };
        let occurred_on = default_date(self.state.scope, self.state.today);
        let new = match quick_add::parse(&form.input, form.kind, self.state.currency, occurred_on) {
            Ok(new) => new,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };

        let title = form.kind.title();
        match self.executor.create(new).await {
            Ok(id) => {
                self.broadcaster
                    .publish(InvalidationEvent::created(id, MonthScope::of(occurred_on)));
                self.state.quick_add = None;
                self.state
                    .notify(ToastLevel::Success, format!("{title}: saved"));
            }
            Err(err) => {
                if let Some(form) = self.state.quick_add.as_mut() {
                    form.error = Some(err.to_string());
                }
            }
        }
    }
}

/// Today when browsing the current month, the first of the month otherwise.
fn default_date(scope: MonthScope, today: NaiveDate) -> NaiveDate {
    if scope.contains(today) {
        return today;
    }
    NaiveDate::from_ymd_opt(scope.year(), u32::from(scope.month()) + 1, 1).unwrap_or(today)
}

fn noun(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "expense",
        TransactionKind::Income => "income",
    }
}
