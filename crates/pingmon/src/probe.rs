use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};

use crate::host::HostStatus;

/// Echo payload carried by every probe
const PROBE_PAYLOAD: [u8; 8] = [0; 8];

/// Outcome of one reachability probe, submitted to the reconciliation channel
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub address: String,
    pub status: HostStatus,
    pub latency_ms: u64,
    pub checked_at: DateTime<Utc>,
}

impl ProbeReport {
    /// Report a host that answered, with its round-trip time
    pub fn online(address: impl Into<String>, rtt: Duration) -> Self {
        Self {
            address: address.into(),
            status: HostStatus::Online,
            latency_ms: rtt.as_millis() as u64,
            checked_at: Utc::now(),
        }
    }

    /// Report a host that did not answer
    pub fn offline(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: HostStatus::Offline,
            latency_ms: 0,
            checked_at: Utc::now(),
        }
    }
}

/// Reachability probe for a single address
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Probe the address once and return the round-trip time if it answered.
    /// Every failure mode (resolution, send, timeout) surfaces as an error.
    async fn probe(&self, address: &str) -> Result<Duration>;
}

/// ICMP echo pinger backed by one socket per address family
pub struct IcmpPinger {
    client_v4: Client,
    client_v6: Client,
    timeout: Duration,
}

impl IcmpPinger {
    /// Open the ICMP sockets. Needs raw-socket privileges, or on Linux a
    /// `net.ipv4.ping_group_range` that covers the process.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client_v4 =
            Client::new(&Config::default()).context("failed to open ICMPv4 socket")?;
        let client_v6 = Client::new(&Config::builder().kind(ICMP::V6).build())
            .context("failed to open ICMPv6 socket")?;

        Ok(Self {
            client_v4,
            client_v6,
            timeout,
        })
    }
}

#[async_trait]
impl Pinger for IcmpPinger {
    async fn probe(&self, address: &str) -> Result<Duration> {
        let ip = resolve(address).await?;

        let client = match ip {
            IpAddr::V4(_) => &self.client_v4,
            IpAddr::V6(_) => &self.client_v6,
        };

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(self.timeout);

        let (_reply, rtt) = pinger.ping(PingSequence(0), &PROBE_PAYLOAD).await?;
        Ok(rtt)
    }
}

/// Resolve an address to an IP, going through DNS for hostnames. Resolution
/// happens on every probe so a changed record is picked up on the next cycle.
async fn resolve(address: &str) -> Result<IpAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(ip);
    }

    tokio::net::lookup_host((address, 0))
        .await
        .with_context(|| format!("failed to resolve {address}"))?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| anyhow!("no addresses found for {address}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_report_carries_rtt_in_millis() {
        let report = ProbeReport::online("1.1.1.1", Duration::from_millis(23));

        assert_eq!(report.address, "1.1.1.1");
        assert_eq!(report.status, HostStatus::Online);
        assert_eq!(report.latency_ms, 23);
    }

    #[test]
    fn offline_report_has_zero_latency() {
        let report = ProbeReport::offline("10.0.0.1");

        assert_eq!(report.status, HostStatus::Offline);
        assert_eq!(report.latency_ms, 0);
    }
}
