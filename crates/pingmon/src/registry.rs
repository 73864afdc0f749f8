use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::host::Host;
use crate::probe::ProbeReport;
use crate::store::HostStore;

/// Authoritative collection of monitored hosts, keyed by address.
///
/// All access goes through one read-write lock: snapshots run concurrently,
/// mutations are exclusive, and [`update_host`] holds the write lock across
/// its membership check and the write itself, so a result from a probe that
/// was in flight when the host got removed can never bring it back.
/// [`register_host`] and [`remove_host`] hold the lock across their store
/// call as well; a racing register/remove pair settles in lock order, and
/// the store always ends up matching the map.
///
/// [`update_host`]: HostRegistry::update_host
/// [`register_host`]: HostRegistry::register_host
/// [`remove_host`]: HostRegistry::remove_host
pub struct HostRegistry {
    hosts: RwLock<HashMap<String, Host>>,
    store: Option<Arc<dyn HostStore>>,
}

impl HostRegistry {
    /// Create an empty in-memory registry
    pub fn new() -> Self {
        Self {
            hosts: RwLock::new(HashMap::new()),
            store: None,
        }
    }

    /// Create a registry that mirrors registrations and removals into `store`
    pub fn with_store(store: Arc<dyn HostStore>) -> Self {
        Self {
            hosts: RwLock::new(HashMap::new()),
            store: Some(store),
        }
    }

    /// Bulk-insert previously persisted hosts without writing back to the
    /// store. Addresses already registered are left untouched.
    pub async fn seed(&self, hosts: Vec<Host>) {
        let mut map = self.hosts.write().await;
        for host in hosts {
            map.entry(host.address.clone()).or_insert(host);
        }
    }

    /// Register a host. Registering an address that already exists is a
    /// silent no-op and keeps the stored description.
    pub async fn register_host(&self, host: Host) {
        let mut hosts = self.hosts.write().await;
        if hosts.contains_key(&host.address) {
            return;
        }
        hosts.insert(host.address.clone(), host.clone());

        // The save runs under the same write lock as the insert, so a
        // racing removal cannot slot in between and leave a row behind
        // for seeding to resurrect at the next startup.
        if let Some(store) = &self.store {
            if let Err(e) = store.save_host(&host).await {
                warn!("Failed to persist host {}: {e:#}", host.address);
            }
        }
    }

    /// Whether an address is currently registered
    pub async fn contains(&self, address: &str) -> bool {
        self.hosts.read().await.contains_key(address)
    }

    /// Point lookup; `None` means the address is not registered
    pub async fn get_host(&self, address: &str) -> Option<Host> {
        self.hosts.read().await.get(address).cloned()
    }

    /// Snapshot of every registered host, in no particular order
    pub async fn all_hosts(&self) -> Vec<Host> {
        self.hosts.read().await.values().cloned().collect()
    }

    /// Snapshot of the registered addresses, in no particular order
    pub async fn host_addresses(&self) -> Vec<String> {
        self.hosts.read().await.keys().cloned().collect()
    }

    /// Number of registered hosts
    pub async fn host_count(&self) -> usize {
        self.hosts.read().await.len()
    }

    /// Guarded update: apply the observed status and latency to the host the
    /// report refers to, but only if that address is still registered.
    /// Returns `false`, changing nothing, when the host is gone.
    pub async fn update_host(&self, report: &ProbeReport) -> bool {
        let mut hosts = self.hosts.write().await;
        match hosts.get_mut(&report.address) {
            Some(host) => {
                host.status = report.status;
                host.latency_ms = report.latency_ms;
                true
            }
            None => false,
        }
    }

    /// Remove a host. Removing an address that is not registered is a no-op;
    /// the store deletion runs either way so no stale row can survive. The
    /// deletion holds the write lock, the counterpart of [`register_host`]
    /// holding it across its save.
    ///
    /// [`register_host`]: HostRegistry::register_host
    pub async fn remove_host(&self, address: &str) {
        let mut hosts = self.hosts.write().await;
        hosts.remove(address);

        if let Some(store) = &self.store {
            if let Err(e) = store.delete_host(address).await {
                warn!("Failed to delete host {address} from store: {e:#}");
            }
        }
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::new()
    }
}
