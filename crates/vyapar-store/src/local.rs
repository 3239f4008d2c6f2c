//! # Local Store (On-Device SQLite)
//!
//! The offline-first backend: records live in a single SQLite file under
//! the app's data directory, no network, no account server.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         vyapar.db (SQLite)                              │
//! │                                                                         │
//! │  records(account, collection, id, payload)   PK (account,collection,id)│
//! │  singletons(account, path, payload)          PK (account,path)         │
//! │                                                                         │
//! │  payload is the record's JSON text. Collections are rows sharing a     │
//! │  (account, collection) prefix, so "schema" changes are just new keys   │
//! │  in the JSON - the table never migrates per domain type.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Change Signal
//! SQLite has no server to push from, so the store carries its own
//! in-process [`broadcast`] bus: every committed mutation publishes its
//! collection name, and [`LocalStore::watch`] forwards matching names as
//! feed ticks. Same-process subscribers see every mutation; that is the
//! whole audience of an on-device store.
//!
//! ## WAL Mode
//! WAL journal mode is enabled so dashboard reads never block a billing
//! write in progress.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapter::{inject_id, merge_shallow, not_found, ChangeFeed, RecordStore, StoredRecord};
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Configuration
// =============================================================================

/// Local store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = LocalConfig::new("/path/to/vyapar.db").max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-operator app)
    pub max_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,
}

impl LocalConfig {
    /// Creates a configuration pointing at the given database file.
    /// The file is created on first connect if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Creates an in-memory configuration (for testing).
    pub fn in_memory() -> Self {
        LocalConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            connect_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Local Store
// =============================================================================

/// Capacity of the in-process change bus. A lagging subscriber misses
/// ticks, not data; its next re-list catches it up.
const CHANGE_BUS_CAPACITY: usize = 64;

/// The on-device SQLite-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    account: String,
    changes: broadcast::Sender<String>,
}

impl LocalStore {
    /// Opens (creating if needed) the local database and prepares the
    /// schema.
    pub async fn connect(config: LocalConfig, account: &str) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            account,
            "Opening local store"
        );

        let connect_options = if config.database_path == PathBuf::from(":memory:") {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::Backend(e.to_string()))?
        } else {
            let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
            SqliteConnectOptions::from_str(&url)
                .map_err(|e| StoreError::Backend(e.to_string()))?
                .create_if_missing(true)
        }
        // WAL: reads never block a billing write in progress
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await?;

        let store = LocalStore {
            pool,
            account: account.to_string(),
            changes: broadcast::channel(CHANGE_BUS_CAPACITY).0,
        };
        store.prepare_schema().await?;

        info!(max_connections = config.max_connections, "Local store ready");
        Ok(store)
    }

    async fn prepare_schema(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                account    TEXT NOT NULL,
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                payload    TEXT NOT NULL,
                PRIMARY KEY (account, collection, id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS singletons (
                account TEXT NOT NULL,
                path    TEXT NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (account, path)
            )",
        )
        .execute(&self.pool)
        .await?;

        debug!("Local schema prepared");
        Ok(())
    }

    /// Closes the connection pool. After this every operation fails.
    pub async fn close(&self) {
        info!("Closing local store");
        self.pool.close().await;
    }

    /// Publishes a committed mutation to in-process watchers.
    fn notify(&self, collection: &str) {
        // No receivers is fine; nobody is watching.
        let _ = self.changes.send(collection.to_string());
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn create(&self, collection: &str, payload: Value) -> StoreResult<StoredRecord> {
        let id = Uuid::new_v4().to_string();
        let payload = inject_id(payload, &id);

        sqlx::query(
            "INSERT INTO records (account, collection, id, payload) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&self.account)
        .bind(collection)
        .bind(&id)
        .bind(payload.to_string())
        .execute(&self.pool)
        .await?;

        debug!(collection, id = %id, "Record created");
        self.notify(collection);
        Ok(StoredRecord { id, payload })
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
        let row = sqlx::query(
            "SELECT payload FROM records
             WHERE account = ?1 AND collection = ?2 AND id = ?3",
        )
        .bind(&self.account)
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(collection, id))?;

        let existing: Value = serde_json::from_str(row.get::<String, _>("payload").as_str())?;
        let merged = inject_id(merge_shallow(existing, patch), id);

        sqlx::query(
            "UPDATE records SET payload = ?4
             WHERE account = ?1 AND collection = ?2 AND id = ?3",
        )
        .bind(&self.account)
        .bind(collection)
        .bind(id)
        .bind(merged.to_string())
        .execute(&self.pool)
        .await?;

        debug!(collection, id, "Record updated");
        self.notify(collection);
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM records WHERE account = ?1 AND collection = ?2 AND id = ?3",
        )
        .bind(&self.account)
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        debug!(collection, id, removed = result.rows_affected(), "Record removed");
        self.notify(collection);
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<StoredRecord>> {
        let rows = sqlx::query(
            "SELECT id, payload FROM records
             WHERE account = ?1 AND collection = ?2
             ORDER BY id",
        )
        .bind(&self.account)
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let payload: Value =
                    serde_json::from_str(row.get::<String, _>("payload").as_str())?;
                Ok(StoredRecord {
                    id: row.get("id"),
                    payload,
                })
            })
            .collect()
    }

    async fn read_singleton(&self, path: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT payload FROM singletons WHERE account = ?1 AND path = ?2")
            .bind(&self.account)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(
                row.get::<String, _>("payload").as_str(),
            )?)),
            None => Ok(None),
        }
    }

    async fn write_singleton(&self, path: &str, payload: Value) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO singletons (account, path, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT (account, path) DO UPDATE SET payload = excluded.payload",
        )
        .bind(&self.account)
        .bind(path)
        .bind(payload.to_string())
        .execute(&self.pool)
        .await?;

        debug!(path, "Singleton written");
        self.notify(path);
        Ok(())
    }

    async fn watch(&self, collection: &str) -> StoreResult<ChangeFeed> {
        let mut bus = self.changes.subscribe();
        let wanted = collection.to_string();
        let (tx, rx) = mpsc::channel(CHANGE_BUS_CAPACITY);

        let task = tokio::spawn(async move {
            loop {
                match bus.recv().await {
                    Ok(name) if name == wanted => {
                        if tx.send(()).await.is_err() {
                            break; // feed dropped
                        }
                    }
                    Ok(_) => {}
                    // A lagged watcher just resumes; its next snapshot
                    // re-list covers whatever it missed.
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        debug!(collection, "Local watch opened");
        Ok(ChangeFeed::new(rx, Some(task)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> LocalStore {
        crate::test_support::init_tracing();
        LocalStore::connect(LocalConfig::in_memory(), "test-account")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_injects_it() {
        let store = store().await;
        let rec = store
            .create("inventory", json!({"name": "Fan"}))
            .await
            .unwrap();
        assert!(!rec.id.is_empty());
        assert_eq!(rec.payload["id"], rec.id.as_str());

        let listed = store.list("inventory").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].payload["name"], "Fan");
    }

    #[tokio::test]
    async fn test_update_merges_top_level() {
        let store = store().await;
        let rec = store
            .create("inventory", json!({"name": "Fan", "price": 100}))
            .await
            .unwrap();

        store
            .update("inventory", &rec.id, json!({"price": 120}))
            .await
            .unwrap();

        let listed = store.list("inventory").await.unwrap();
        assert_eq!(listed[0].payload["name"], "Fan");
        assert_eq!(listed[0].payload["price"], 120);
        assert_eq!(listed[0].payload["id"], rec.id.as_str());
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let store = store().await;
        let err = store
            .update("inventory", "nope", json!({"price": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = store().await;
        let rec = store.create("customers", json!({"name": "A"})).await.unwrap();
        store.remove("customers", &rec.id).await.unwrap();
        store.remove("customers", &rec.id).await.unwrap();
        assert!(store.list("customers").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = store().await;
        store.create("inventory", json!({"name": "Fan"})).await.unwrap();
        store.create("customers", json!({"name": "A"})).await.unwrap();
        assert_eq!(store.list("inventory").await.unwrap().len(), 1);
        assert_eq!(store.list("customers").await.unwrap().len(), 1);
        assert!(store.list("invoices").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_singleton_roundtrip_and_upsert() {
        let store = store().await;
        assert!(store.read_singleton("settings").await.unwrap().is_none());

        store
            .write_singleton("settings", json!({"name": "Smart Electronics"}))
            .await
            .unwrap();
        store
            .write_singleton("settings", json!({"name": "Smart Electronics", "gstin": "X"}))
            .await
            .unwrap();

        let settings = store.read_singleton("settings").await.unwrap().unwrap();
        assert_eq!(settings["gstin"], "X");
    }

    #[tokio::test]
    async fn test_watch_ticks_once_per_mutation() {
        let store = store().await;
        let mut feed = store.watch("inventory").await.unwrap();

        let rec = store.create("inventory", json!({"name": "Fan"})).await.unwrap();
        store
            .update("inventory", &rec.id, json!({"price": 1}))
            .await
            .unwrap();
        store.remove("inventory", &rec.id).await.unwrap();
        // Mutations in another collection must not tick this feed.
        store.create("customers", json!({"name": "A"})).await.unwrap();

        assert_eq!(feed.changed().await, Some(()));
        assert_eq!(feed.changed().await, Some(()));
        assert_eq!(feed.changed().await, Some(()));
        tokio::task::yield_now().await;
        assert!(!feed.try_changed());
    }
}
