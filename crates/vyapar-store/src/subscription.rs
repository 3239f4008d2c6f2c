//! # Live Collection Subscriptions
//!
//! The read model most of the app runs on: subscribe to a collection, get
//! a full typed snapshot immediately, then one fresh snapshot per
//! committed mutation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   subscribe ──► snapshot #0 (current state, delivered immediately)     │
//! │   mutation  ──► change tick ──► re-list ──► snapshot #1                │
//! │   mutation  ──► change tick ──► re-list ──► snapshot #2                │
//! │   unsubscribe / drop ──► listener task aborted, nothing else arrives   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are whole-collection and typed. Whole-collection keeps the
//! consumer trivially correct (no delta reconciliation); these collections
//! are a few hundred records at most.
//!
//! A record that fails to decode is skipped with a warning rather than
//! poisoning the subscription; one corrupt record must not blank the
//! inventory screen.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapter::RecordStore;
use crate::error::StoreResult;

/// Buffered snapshots; a consumer this far behind only needs the newest.
const SNAPSHOT_CAPACITY: usize = 16;

/// A live, typed view of one collection.
pub struct LiveCollection<T> {
    rx: mpsc::Receiver<Vec<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T: DeserializeOwned + Send + 'static> LiveCollection<T> {
    /// Subscribes to `collection`. The current snapshot is queued before
    /// this returns, so the first [`next_snapshot`](Self::next_snapshot)
    /// never blocks on a mutation.
    pub async fn subscribe(
        store: Arc<dyn RecordStore>,
        collection: &str,
    ) -> StoreResult<Self> {
        let mut feed = store.watch(collection).await?;
        let (tx, rx) = mpsc::channel(SNAPSHOT_CAPACITY);

        let initial = snapshot::<T>(store.as_ref(), collection).await?;
        // Capacity is fresh, so this cannot block.
        let _ = tx.try_send(initial);

        let name = collection.to_string();
        let task = tokio::spawn(async move {
            while feed.changed().await.is_some() {
                match snapshot::<T>(store.as_ref(), &name).await {
                    Ok(snap) => {
                        if tx.send(snap).await.is_err() {
                            break; // subscriber gone
                        }
                    }
                    // Transient backend failure: keep the subscription
                    // alive, the next tick retries.
                    Err(err) => warn!(collection = %name, %err, "Snapshot refresh failed"),
                }
            }
            debug!(collection = %name, "Live collection closed");
        });

        Ok(LiveCollection {
            rx,
            task: Some(task),
        })
    }

    /// Waits for the next snapshot. `None` after the feed has shut down.
    pub async fn next_snapshot(&mut self) -> Option<Vec<T>> {
        self.rx.recv().await
    }

    /// Non-blocking probe, mainly for tests.
    pub fn try_snapshot(&mut self) -> Option<Vec<T>> {
        self.rx.try_recv().ok()
    }

    /// Ends the subscription. Equivalent to dropping the value; spelled
    /// out for call sites where the teardown is the point.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for LiveCollection<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// One full typed snapshot, in store order. Undecodable records are
/// skipped with a warning.
async fn snapshot<T: DeserializeOwned>(
    store: &dyn RecordStore,
    collection: &str,
) -> StoreResult<Vec<T>> {
    let records = store.list(collection).await?;
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        match record.decode::<T>() {
            Ok(value) => out.push(value),
            Err(err) => warn!(collection, id = %record.id, %err, "Skipping undecodable record"),
        }
    }
    Ok(out)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{LocalConfig, LocalStore};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    async fn store() -> Arc<dyn RecordStore> {
        crate::test_support::init_tracing();
        Arc::new(
            LocalStore::connect(LocalConfig::in_memory(), "test-account")
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_immediate() {
        let store = store().await;
        store.create("inventory", json!({"name": "Fan"})).await.unwrap();

        let mut live = LiveCollection::<Named>::subscribe(store, "inventory")
            .await
            .unwrap();
        let first = live.next_snapshot().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Fan");
    }

    #[tokio::test]
    async fn test_each_mutation_yields_a_fresh_snapshot() {
        let store = store().await;
        let mut live = LiveCollection::<Named>::subscribe(store.clone(), "inventory")
            .await
            .unwrap();
        assert!(live.next_snapshot().await.unwrap().is_empty());

        store.create("inventory", json!({"name": "Fan"})).await.unwrap();
        let after_first = live.next_snapshot().await.unwrap();
        assert_eq!(after_first.len(), 1);

        store.create("inventory", json!({"name": "Mixer"})).await.unwrap();
        let after_second = live.next_snapshot().await.unwrap();
        assert_eq!(after_second.len(), 2);
    }

    #[tokio::test]
    async fn test_other_collections_do_not_tick() {
        let store = store().await;
        let mut live = LiveCollection::<Named>::subscribe(store.clone(), "inventory")
            .await
            .unwrap();
        assert!(live.next_snapshot().await.unwrap().is_empty());

        store.create("customers", json!({"name": "A"})).await.unwrap();
        tokio::task::yield_now().await;
        assert!(live.try_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_record_is_skipped_not_fatal() {
        let store = store().await;
        store.create("inventory", json!({"name": "Fan"})).await.unwrap();
        // No "name" field: fails to decode into Named.
        store.create("inventory", json!({"label": "Oops"})).await.unwrap();

        let mut live = LiveCollection::<Named>::subscribe(store, "inventory")
            .await
            .unwrap();
        let snap = live.next_snapshot().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].name, "Fan");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = store().await;
        let mut live = LiveCollection::<Named>::subscribe(store.clone(), "inventory")
            .await
            .unwrap();
        assert!(live.next_snapshot().await.unwrap().is_empty());
        live.unsubscribe();

        // Mutations after teardown reach nobody; the store itself is fine.
        store.create("inventory", json!({"name": "Fan"})).await.unwrap();
        assert_eq!(store.list("inventory").await.unwrap().len(), 1);
    }
}
