//! Pingmon core library.
//!
//! Provides the concurrency-safe host registry, the periodic ping
//! scheduler, and the in-memory observation history that back the
//! Pingmon service. The HTTP layer and the persistence backend live in
//! the service crate and talk to this one through [`HostRegistry`],
//! [`HistoryLog`], and the [`HostStore`] trait.

pub mod history;
pub mod host;
pub mod probe;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod validation;

// Re-export main types
pub use history::{HistoryLog, LogEntry};
pub use host::{Host, HostStatus};
pub use probe::{IcmpPinger, Pinger, ProbeReport};
pub use registry::HostRegistry;
pub use scheduler::PingScheduler;
pub use store::HostStore;
pub use validation::valid_address;

/// Re-export common error types
pub use anyhow;

/// Pingmon result type using anyhow
pub type Result<T> = anyhow::Result<T>;

/// Default seconds between two probe cycles
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 5;

/// Default seconds before an unanswered probe counts as a failure
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 2;

/// Longest accepted host description, enforced at the API boundary
pub const MAX_DESCRIPTION_LEN: usize = 200;
