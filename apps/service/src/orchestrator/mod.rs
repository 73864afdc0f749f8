//! Coordinates the monitoring components: runs migrations, seeds state from
//! the store, starts the ping scheduler, and drains probe reports into the
//! registry, history, and store.


use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pingmon::{
    HistoryLog, HostRegistry, HostStore, IcmpPinger, LogEntry, PingScheduler, Pinger, ProbeReport,
};

use crate::config::Config;
use crate::database::{LibsqlStore, initialize_database};
use crate::pool::LibsqlPool;

/// How much persisted history is reloaded per host at startup
const HISTORY_SEED_LIMIT: usize = 100;

/// Main coordinator for the Pingmon service
pub struct Orchestrator {
    registry: Arc<HostRegistry>,
    history: Arc<HistoryLog>,
    store: Arc<dyn HostStore>,
    pinger: Arc<dyn Pinger>,
    ping_interval: Duration,
}

impl Orchestrator {
    /// Create a new orchestrator with the real ICMP pinger. Fails up front
    /// when the ICMP sockets cannot be opened, rather than failing every
    /// probe afterwards.
    pub async fn new(config: &Config, pool: LibsqlPool) -> Result<Self> {
        let pinger: Arc<dyn Pinger> = Arc::new(
            IcmpPinger::new(Duration::from_secs(config.monitor.timeout_seconds))
                .context("failed to set up ICMP pinger")?,
        );

        Self::with_pinger(config, pool, pinger).await
    }

    /// Create a new orchestrator with a caller-supplied pinger
    pub async fn with_pinger(
        config: &Config,
        pool: LibsqlPool,
        pinger: Arc<dyn Pinger>,
    ) -> Result<Self> {
        let conn = pool.get().await?;

        info!("Initializing database schema...");
        initialize_database(&conn).await?;

        let store: Arc<dyn HostStore> = Arc::new(LibsqlStore::new(pool));
        let registry = Arc::new(HostRegistry::with_store(store.clone()));
        let history = Arc::new(HistoryLog::new());

        info!("Loading hosts from database...");
        let hosts = store.all_hosts().await?;
        info!("Found {} persisted hosts", hosts.len());

        for host in &hosts {
            let entries = store
                .recent_observations(&host.address, HISTORY_SEED_LIMIT)
                .await?;
            if !entries.is_empty() {
                history.seed(host.address.clone(), entries).await;
            }
        }
        registry.seed(hosts).await;

        Ok(Self {
            registry,
            history,
            store,
            pinger,
            ping_interval: Duration::from_secs(config.monitor.interval_seconds),
        })
    }

    /// Registry shared with the HTTP layer
    pub fn registry(&self) -> Arc<HostRegistry> {
        self.registry.clone()
    }

    /// History shared with the HTTP layer
    pub fn history(&self) -> Arc<HistoryLog> {
        self.history.clone()
    }

    /// Start the scheduler and the reconciliation consumer as background
    /// tasks. The single consumer is what serializes all status writes.
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        let (report_tx, report_rx) = mpsc::channel::<ProbeReport>(100);

        let scheduler = PingScheduler::new(
            self.registry.clone(),
            self.pinger.clone(),
            self.ping_interval,
            report_tx,
        );

        info!(
            "Starting ping scheduler (interval: {}s)",
            self.ping_interval.as_secs()
        );
        let scheduler_handle = scheduler.spawn();

        let reconciler_handle = tokio::spawn(reconcile_loop(
            report_rx,
            self.registry.clone(),
            self.history.clone(),
            self.store.clone(),
        ));

        vec![scheduler_handle, reconciler_handle]
    }
}

/// Single consumer of the report channel. Applies each report through the
/// registry's guarded update; a report whose host was removed mid-flight is
/// dropped whole, without leaving a history entry.
async fn reconcile_loop(
    mut report_rx: mpsc::Receiver<ProbeReport>,
    registry: Arc<HostRegistry>,
    history: Arc<HistoryLog>,
    store: Arc<dyn HostStore>,
) {
    while let Some(report) = report_rx.recv().await {
        if !registry.update_host(&report).await {
            debug!("Dropping report for removed host {}", report.address);
            continue;
        }

        if let Err(e) = store.record_observation(&report).await {
            warn!("Failed to record observation for {}: {e:#}", report.address);
        }

        history
            .add_entry(&report.address, LogEntry::from(&report))
            .await;

        info!(
            "Host {} - Status: {} - Latency: {}ms",
            report.address, report.status, report.latency_ms
        );
    }

    info!("Report channel closed, reconciliation loop stopping");
}
