pub use broadcast::{InvalidationBroadcaster, InvalidationEvent, InvalidationReason, Subscription};
pub use categories::{
    BANK_ICON, BankConnection, BankDirectory, CategoryIcons, FALLBACK_ICON, RowIcon, resolve_icon,
};
pub use coordinator::{DEFAULT_REMOVAL_DELAY, RemovalCoordinator, Resolution};
pub use currency::Currency;
pub use error::{EngineError, MutationError, Transition};
pub use executor::{MutationExecutor, Reservation};
pub use memory::InMemoryStore;
pub use money::Money;
pub use presenter::{Projection, Row, project};
pub use scope::MonthScope;
pub use store::{StoreError, TransactionStore};
pub use transactions::{NewTransaction, Origin, Transaction, TransactionId, TransactionKind};
pub use view::ListView;
pub use visibility::VisibilityState;

mod broadcast;
mod categories;
mod coordinator;
mod currency;
mod error;
mod executor;
mod memory;
mod money;
mod presenter;
mod scope;
mod store;
mod transactions;
mod view;
mod visibility;

pub type ResultEngine<T> = Result<T, EngineError>;
