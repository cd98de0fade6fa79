//! Ledger event vocabulary shared by the domain and storage layers.

pub mod envelope;
pub mod event;

pub use envelope::EventEnvelope;
pub use event::Event;
