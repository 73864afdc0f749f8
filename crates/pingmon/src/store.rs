use anyhow::Result;
use async_trait::async_trait;

use crate::history::LogEntry;
use crate::host::Host;
use crate::probe::ProbeReport;

/// Persistence collaborator for hosts and their observation history.
///
/// The registry mirrors registrations and removals into an implementation of
/// this trait; the reconciliation loop appends observations through it. A
/// failing store is logged by the caller and never takes down a probe cycle.
#[async_trait]
pub trait HostStore: Send + Sync {
    /// Persist a host keyed by its address
    async fn save_host(&self, host: &Host) -> Result<()>;

    /// Fetch one host by address
    async fn get_host(&self, address: &str) -> Result<Option<Host>>;

    /// Fetch every persisted host
    async fn all_hosts(&self) -> Result<Vec<Host>>;

    /// Delete a host by address; deleting an absent address is a no-op
    async fn delete_host(&self, address: &str) -> Result<()>;

    /// Append one reconciled probe observation
    async fn record_observation(&self, report: &ProbeReport) -> Result<()>;

    /// Most recent observations for an address, oldest first
    async fn recent_observations(&self, address: &str, limit: usize) -> Result<Vec<LogEntry>>;
}
