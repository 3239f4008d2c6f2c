//! # Record Store Adapter
//!
//! The single seam between application logic and whichever backend the
//! operator picked. Every adapter speaks the same contract:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RecordStore Contract                             │
//! │                                                                         │
//! │   create(collection, payload)  ─► StoredRecord (id assigned)           │
//! │   update(collection, id, patch)─► shallow top-level merge              │
//! │   remove(collection, id)       ─► idempotent delete                    │
//! │   list(collection)             ─► full snapshot, ordered by id         │
//! │   read/write_singleton(path)   ─► one document per account (settings)  │
//! │   watch(collection)            ─► ChangeFeed: one tick per mutation    │
//! │                                                                         │
//! │   Implementations: LocalStore (SQLite) · DocStore (Redis)              │
//! │                    TableStore (Postgres)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records cross this boundary as JSON values. The adapter owns id
//! assignment on create and injects the id into the stored payload, so a
//! listed record always carries its own id.
//!
//! ## Change Feeds
//! A [`ChangeFeed`] delivers one unit tick per committed mutation in its
//! collection. Ticks carry no payload; the subscriber re-lists to get a
//! fresh snapshot. Dropping the feed tears down whatever backend resource
//! (broadcast task, pub/sub connection, LISTEN session) was feeding it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Stored Record
// =============================================================================

/// One record as the backend holds it: its id plus the JSON payload.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub payload: Value,
}

impl StoredRecord {
    /// Decodes the payload into a domain type.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Decodes a snapshot into typed records, in snapshot order.
pub fn decode_all<T: DeserializeOwned>(records: &[StoredRecord]) -> StoreResult<Vec<T>> {
    records.iter().map(StoredRecord::decode).collect()
}

// =============================================================================
// Change Feed
// =============================================================================

/// A live stream of change ticks for one collection.
///
/// Holds the backend listener task; dropping the feed aborts it, which is
/// the teardown guarantee every subscriber relies on.
pub struct ChangeFeed {
    rx: mpsc::Receiver<()>,
    task: Option<JoinHandle<()>>,
}

impl ChangeFeed {
    /// Wraps a tick receiver and the listener task feeding it. Backends
    /// that signal without a dedicated task pass `None`.
    pub fn new(rx: mpsc::Receiver<()>, task: Option<JoinHandle<()>>) -> Self {
        ChangeFeed { rx, task }
    }

    /// Waits for the next change tick. `None` means the backend side of
    /// the feed has shut down.
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Non-blocking probe, mainly for tests.
    pub fn try_changed(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// Record Store Trait
// =============================================================================

/// The backend contract. Object-safe so the provider selector can hand out
/// `Arc<dyn RecordStore>` without the caller knowing which backend is live.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a record, assigns its id, and returns the stored form.
    async fn create(&self, collection: &str, payload: Value) -> StoreResult<StoredRecord>;

    /// Shallow top-level merge of `patch` into the existing record.
    /// Fails with [`StoreError::NotFound`] if the id does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()>;

    /// Deletes a record. Removing an id that is already gone is a no-op.
    async fn remove(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Full snapshot of the collection, ordered by id for determinism.
    async fn list(&self, collection: &str) -> StoreResult<Vec<StoredRecord>>;

    /// Reads a per-account singleton document (e.g. company settings).
    async fn read_singleton(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Writes (upserts) a per-account singleton document.
    async fn write_singleton(&self, path: &str, payload: Value) -> StoreResult<()>;

    /// Opens a change feed for the collection.
    async fn watch(&self, collection: &str) -> StoreResult<ChangeFeed>;
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Shallow top-level merge: every key in `patch` replaces the same key in
/// `base`; untouched keys survive. Non-object patches replace wholesale.
pub(crate) fn merge_shallow(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (k, v) in patch {
                base.insert(k, v);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

/// Forces the record's own id into its payload so snapshots are
/// self-describing. Non-object payloads are wrapped.
pub(crate) fn inject_id(payload: Value, id: &str) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.insert("id".to_string(), Value::String(id.to_string()));
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert("id".to_string(), Value::String(id.to_string()));
            map.insert("value".to_string(), other);
            Value::Object(map)
        }
    }
}

/// Maps a driver-level "no rows" style miss into [`StoreError::NotFound`].
pub(crate) fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_shallow_replaces_top_level_keys_only() {
        let base = json!({"name": "Fan", "price": 100, "nested": {"a": 1, "b": 2}});
        let patch = json!({"price": 120, "nested": {"a": 9}});
        let merged = merge_shallow(base, patch);
        assert_eq!(merged["name"], "Fan");
        assert_eq!(merged["price"], 120);
        // Top-level merge: the nested object is replaced, not merged.
        assert_eq!(merged["nested"], json!({"a": 9}));
    }

    #[test]
    fn test_inject_id_overwrites_stale_id() {
        let payload = json!({"id": "old", "name": "Fan"});
        let out = inject_id(payload, "new");
        assert_eq!(out["id"], "new");
        assert_eq!(out["name"], "Fan");
    }

    #[test]
    fn test_decode_all() {
        let records = vec![
            StoredRecord {
                id: "1".into(),
                payload: json!({"name": "A"}),
            },
            StoredRecord {
                id: "2".into(),
                payload: json!({"name": "B"}),
            },
        ];
        let names: Vec<serde_json::Value> = decode_all(&records).unwrap();
        assert_eq!(names[1]["name"], "B");
    }

    #[tokio::test]
    async fn test_change_feed_drop_aborts_task() {
        let (tx, rx) = mpsc::channel(4);
        let task = tokio::spawn(async move {
            loop {
                if tx.send(()).await.is_err() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        });
        let mut feed = ChangeFeed::new(rx, Some(task));
        assert_eq!(feed.changed().await, Some(()));
        drop(feed);
        // Dropped feed aborted the task; nothing left to assert beyond the
        // absence of a leaked spawn, which the runtime shutdown enforces.
    }
}
