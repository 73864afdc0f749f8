use serde::{Deserialize, Serialize};
use std::fmt;

/// Reachability state of a monitored host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    /// Not probed yet
    Unknown,
    /// Last probe went unanswered
    Offline,
    /// Last probe was answered
    Online,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Unknown => write!(f, "unknown"),
            HostStatus::Offline => write!(f, "offline"),
            HostStatus::Online => write!(f, "online"),
        }
    }
}

/// A monitored endpoint together with its latest observed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// IP literal or hostname; unique key within the registry
    pub address: String,
    /// Free-form label, bounded at the API boundary
    pub description: String,
    /// Latest probe outcome, `Unknown` until the first probe completes
    pub status: HostStatus,
    /// Round-trip time of the latest probe in milliseconds, 0 unless online
    pub latency_ms: u64,
}

impl Host {
    /// Create a host that has not been probed yet
    pub fn new(address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            description: description.into(),
            status: HostStatus::Unknown,
            latency_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_host_starts_unknown() {
        let host = Host::new("192.168.1.1", "gateway");

        assert_eq!(host.status, HostStatus::Unknown);
        assert_eq!(host.latency_ms, 0);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HostStatus::Online).unwrap(),
            "\"online\""
        );
        assert_eq!(
            serde_json::to_string(&HostStatus::Unknown).unwrap(),
            "\"unknown\""
        );
    }
}
