use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error};

use crate::probe::{Pinger, ProbeReport};
use crate::registry::HostRegistry;

/// Drives the periodic probe cycle.
///
/// Every tick the scheduler snapshots the registered addresses and spawns one
/// independent probe task per address; each task submits a [`ProbeReport`] to
/// the report channel as soon as its probe settles. Reports arrive in
/// completion order, not dispatch order, and a slow host never delays the
/// probes of the others or the next cycle. A probe still in flight when the
/// next cycle fires gets a second concurrent probe; nothing de-duplicates
/// them, so an address can briefly have two results racing toward the
/// channel.
pub struct PingScheduler {
    registry: Arc<HostRegistry>,
    pinger: Arc<dyn Pinger>,
    interval: Duration,
    report_tx: mpsc::Sender<ProbeReport>,
}

impl PingScheduler {
    /// Create a scheduler. A zero `interval` is floored to one millisecond;
    /// the cycle timer cannot run with a zero period.
    pub fn new(
        registry: Arc<HostRegistry>,
        pinger: Arc<dyn Pinger>,
        interval: Duration,
        report_tx: mpsc::Sender<ProbeReport>,
    ) -> Self {
        Self {
            registry,
            pinger,
            interval: interval.max(Duration::from_millis(1)),
            report_tx,
        }
    }

    /// Spawn the cycle loop as a long-running background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut timer = interval(self.interval);

        loop {
            timer.tick().await;

            let addresses = self.registry.host_addresses().await;
            debug!("Dispatching probes for {} hosts", addresses.len());

            for address in addresses {
                let pinger = self.pinger.clone();
                let report_tx = self.report_tx.clone();

                tokio::spawn(async move {
                    let report = match pinger.probe(&address).await {
                        Ok(rtt) => ProbeReport::online(address, rtt),
                        Err(e) => {
                            debug!("Probe failed for {address}: {e:#}");
                            ProbeReport::offline(address)
                        }
                    };

                    if let Err(e) = report_tx.send(report).await {
                        error!("Failed to submit probe report: {e}");
                    }
                });
            }
        }
    }
}
