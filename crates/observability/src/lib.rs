//! Process-wide tracing setup shared by binaries and tests.

/// Initialize tracing from the environment.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, output format).
pub mod tracing;

pub use tracing::{LogFormat, ObservabilityConfig};
