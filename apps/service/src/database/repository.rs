use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params;

use pingmon::{Host, HostStatus, HostStore, LogEntry, ProbeReport};

use crate::pool::{LibsqlManager, LibsqlPool};

/// Libsql-backed implementation of the host store
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    /// Create a new store from a connection pool
    pub fn new(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

/// Map a stored status string back to the enum; unrecognized strings fold to
/// `Unknown` instead of failing the whole query
fn status_from_str(raw: &str) -> HostStatus {
    match raw {
        "online" => HostStatus::Online,
        "offline" => HostStatus::Offline,
        _ => HostStatus::Unknown,
    }
}

fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[async_trait]
impl HostStore for LibsqlStore {
    async fn save_host(&self, host: &Host) -> Result<()> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO hosts (address, description, created_at) VALUES (?, ?, ?)
             ON CONFLICT(address) DO UPDATE SET description = excluded.description",
            params![
                host.address.clone(),
                host.description.clone(),
                Utc::now().timestamp()
            ],
        )
        .await
        .context("failed to save host")?;

        Ok(())
    }

    async fn get_host(&self, address: &str) -> Result<Option<Host>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT address, description FROM hosts WHERE address = ?",
                params![address],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let address: String = row.get(0)?;
                let description: String = row.get(1)?;
                Ok(Some(Host::new(address, description)))
            }
            None => Ok(None),
        }
    }

    async fn all_hosts(&self) -> Result<Vec<Host>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT address, description FROM hosts ORDER BY created_at")
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut hosts = Vec::new();

        while let Some(row) = rows.next().await? {
            let address: String = row.get(0)?;
            let description: String = row.get(1)?;
            hosts.push(Host::new(address, description));
        }

        Ok(hosts)
    }

    async fn delete_host(&self, address: &str) -> Result<()> {
        let conn = self.get_conn().await?;

        conn.execute("DELETE FROM hosts WHERE address = ?", params![address])
            .await?;

        Ok(())
    }

    async fn record_observation(&self, report: &ProbeReport) -> Result<()> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO observations (address, status, latency_ms, timestamp) VALUES (?, ?, ?, ?)",
            params![
                report.address.clone(),
                report.status.to_string(),
                report.latency_ms as i64,
                report.checked_at.timestamp_millis()
            ],
        )
        .await?;

        Ok(())
    }

    async fn recent_observations(&self, address: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT status, latency_ms, timestamp FROM (
                    SELECT status, latency_ms, timestamp FROM observations
                    WHERE address = ? ORDER BY timestamp DESC LIMIT ?
                ) ORDER BY timestamp ASC",
            )
            .await?;

        let mut rows = stmt.query(params![address, limit as i64]).await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            let status: String = row.get(0)?;
            let latency_ms: i64 = row.get(1)?;
            let timestamp: i64 = row.get(2)?;

            entries.push(LogEntry::new(
                status_from_str(&status),
                latency_ms as u64,
                millis_to_timestamp(timestamp),
            ));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::*;
    use crate::database::initialize_database;
    use crate::pool::create_pool;

    async fn test_store() -> Result<(LibsqlStore, LibsqlPool, tempfile::TempDir)> {
        let dir = tempdir()?;
        let db_path = dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).await?;

        let conn = pool.get().await?;
        initialize_database(&conn).await?;

        Ok((LibsqlStore::new(pool.clone()), pool, dir))
    }

    #[tokio::test]
    async fn hosts_round_trip_and_delete() -> Result<()> {
        let (store, _pool, _dir) = test_store().await?;

        store.save_host(&Host::new("10.0.0.1", "gateway")).await?;
        store.save_host(&Host::new("example.org", "")).await?;

        let host = store.get_host("10.0.0.1").await?.expect("host missing");
        assert_eq!(host.description, "gateway");
        assert_eq!(host.status, HostStatus::Unknown);

        assert_eq!(store.all_hosts().await?.len(), 2);

        store.delete_host("10.0.0.1").await?;
        assert!(store.get_host("10.0.0.1").await?.is_none());
        assert_eq!(store.all_hosts().await?.len(), 1);

        // Deleting again is a no-op
        store.delete_host("10.0.0.1").await?;

        Ok(())
    }

    #[tokio::test]
    async fn saving_an_existing_host_updates_the_description() -> Result<()> {
        let (store, _pool, _dir) = test_store().await?;

        store.save_host(&Host::new("10.0.0.1", "old label")).await?;
        store.save_host(&Host::new("10.0.0.1", "new label")).await?;

        let host = store.get_host("10.0.0.1").await?.expect("host missing");
        assert_eq!(host.description, "new label");
        assert_eq!(store.all_hosts().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn observations_come_back_oldest_first_and_limited() -> Result<()> {
        let (store, _pool, _dir) = test_store().await?;

        for latency in 1..=5u64 {
            let mut report = ProbeReport::online("10.0.0.1", Duration::from_millis(latency));
            // Spread timestamps so ordering does not depend on insert speed
            report.checked_at = Utc::now() + chrono::Duration::milliseconds(latency as i64);
            store.record_observation(&report).await?;
        }

        let entries = store.recent_observations("10.0.0.1", 3).await?;
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries.iter().map(|e| e.latency_ms).collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        // Other addresses are untouched
        assert!(store.recent_observations("10.0.0.2", 10).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unrecognized_status_strings_fold_to_unknown() -> Result<()> {
        let (store, pool, _dir) = test_store().await?;

        let conn = pool.get().await?;
        conn.execute(
            "INSERT INTO observations (address, status, latency_ms, timestamp) VALUES (?, ?, ?, ?)",
            params!["10.0.0.1", "degraded", 7i64, Utc::now().timestamp_millis()],
        )
        .await?;

        let entries = store.recent_observations("10.0.0.1", 10).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, HostStatus::Unknown);

        Ok(())
    }
}
