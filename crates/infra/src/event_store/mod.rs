//! Append-only event store boundary.
//!
//! Storage abstraction for group event streams, with no assumptions about the
//! backing technology.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};
