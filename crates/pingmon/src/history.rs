use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::host::HostStatus;
use crate::probe::ProbeReport;

/// One historical observation of a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub status: HostStatus,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(status: HostStatus, latency_ms: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            status,
            latency_ms,
            timestamp,
        }
    }
}

impl From<&ProbeReport> for LogEntry {
    fn from(report: &ProbeReport) -> Self {
        Self {
            status: report.status,
            latency_ms: report.latency_ms,
            timestamp: report.checked_at,
        }
    }
}

/// Observation log keyed by address.
///
/// Entries sit in insertion order, which is chronological per address because
/// the single reconciliation consumer appends them one at a time. The log is
/// append-only and unbounded for the lifetime of the process; an address
/// keeps its entries even after the host is removed from the registry.
pub struct HistoryLog {
    entries: RwLock<HashMap<String, Vec<LogEntry>>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the log for `address` with previously persisted entries
    pub async fn seed(&self, address: impl Into<String>, entries: Vec<LogEntry>) {
        self.entries.write().await.insert(address.into(), entries);
    }

    /// Append one observation for `address`
    pub async fn add_entry(&self, address: &str, entry: LogEntry) {
        self.entries
            .write()
            .await
            .entry(address.to_owned())
            .or_default()
            .push(entry);
    }

    /// All observations for `address`, oldest first; empty when none exist
    pub async fn entries_for(&self, address: &str) -> Vec<LogEntry> {
        self.entries
            .read()
            .await
            .get(address)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
