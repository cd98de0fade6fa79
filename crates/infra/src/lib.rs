//! Infrastructure for group ledgers: event storage, command execution and
//! the read-side view.

pub mod command_dispatcher;
pub mod config;
pub mod event_store;
pub mod ledger_view;

pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use config::InfraConfig;
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};
pub use ledger_view::LedgerView;
