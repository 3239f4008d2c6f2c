//! # Document Store (Hosted Redis)
//!
//! The hosted document backend: each collection is one Redis hash, each
//! record one field of that hash, so a snapshot is a single `HGETALL`.
//!
//! ## Key Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  vyapar:{account}:{collection}   HASH   field = record id              │
//! │                                          value = record JSON            │
//! │  vyapar:{account}:{path}         STRING singleton JSON (settings)       │
//! │  vyapar:{account}:changes        PUB/SUB channel, payload = collection  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All keys carry the account id, so two accounts on one server never see
//! each other's records.
//!
//! ## Change Signal
//! Every committed mutation publishes its collection name on the account's
//! change channel. [`DocStore::watch`] opens a dedicated pub/sub
//! connection, filters for its collection, and forwards ticks; dropping
//! the feed aborts the forwarding task and with it the pub/sub connection.

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapter::{inject_id, merge_shallow, not_found, ChangeFeed, RecordStore, StoredRecord};
use crate::error::StoreResult;

// =============================================================================
// Configuration
// =============================================================================

/// Document store configuration.
#[derive(Debug, Clone)]
pub struct DocConfig {
    /// Redis connection URL, e.g. `redis://:password@host:6379/0`.
    pub url: String,
}

impl DocConfig {
    pub fn new(url: impl Into<String>) -> Self {
        DocConfig { url: url.into() }
    }
}

// =============================================================================
// Key Layout
// =============================================================================

fn collection_key(account: &str, collection: &str) -> String {
    format!("vyapar:{account}:{collection}")
}

fn change_channel(account: &str) -> String {
    format!("vyapar:{account}:changes")
}

// =============================================================================
// Document Store
// =============================================================================

/// Feed buffer; a slow subscriber drops ticks, not data.
const FEED_CAPACITY: usize = 64;

/// The hosted Redis-backed [`RecordStore`].
#[derive(Clone)]
pub struct DocStore {
    client: redis::Client,
    conn: ConnectionManager,
    account: String,
}

impl DocStore {
    /// Connects to the document store. The connection manager reconnects
    /// on its own after transient network failures.
    pub async fn connect(config: DocConfig, account: &str) -> StoreResult<Self> {
        info!(account, "Connecting to document store");
        let client = redis::Client::open(config.url.as_str())?;
        let conn = client.get_connection_manager().await?;
        info!("Document store connected");
        Ok(DocStore {
            client,
            conn,
            account: account.to_string(),
        })
    }

    async fn publish(&self, collection: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .publish(change_channel(&self.account), collection)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for DocStore {
    async fn create(&self, collection: &str, payload: Value) -> StoreResult<StoredRecord> {
        let id = Uuid::new_v4().to_string();
        let payload = inject_id(payload, &id);

        let mut conn = self.conn.clone();
        let _: () = conn
            .hset(
                collection_key(&self.account, collection),
                &id,
                payload.to_string(),
            )
            .await?;

        debug!(collection, id = %id, "Record created");
        self.publish(collection).await?;
        Ok(StoredRecord { id, payload })
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
        let key = collection_key(&self.account, collection);
        let mut conn = self.conn.clone();

        let existing: Option<String> = conn.hget(&key, id).await?;
        let existing = existing.ok_or_else(|| not_found(collection, id))?;
        let existing: Value = serde_json::from_str(&existing)?;
        let merged = inject_id(merge_shallow(existing, patch), id);

        let _: () = conn.hset(&key, id, merged.to_string()).await?;

        debug!(collection, id, "Record updated");
        self.publish(collection).await?;
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        // HDEL of a missing field is a no-op, which is exactly the
        // idempotence the contract asks for.
        let _: () = conn
            .hdel(collection_key(&self.account, collection), id)
            .await?;

        debug!(collection, id, "Record removed");
        self.publish(collection).await?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<StoredRecord>> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn
            .hgetall(collection_key(&self.account, collection))
            .await?;

        let mut records = raw
            .into_iter()
            .map(|(id, json)| {
                let payload: Value = serde_json::from_str(&json)?;
                Ok(StoredRecord { id, payload })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        // Hash iteration order is arbitrary; the contract promises id order.
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn read_singleton(&self, path: &str) -> StoreResult<Option<Value>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(collection_key(&self.account, path)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write_singleton(&self, path: &str, payload: Value) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(collection_key(&self.account, path), payload.to_string())
            .await?;

        debug!(path, "Singleton written");
        self.publish(path).await?;
        Ok(())
    }

    async fn watch(&self, collection: &str) -> StoreResult<ChangeFeed> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(change_channel(&self.account)).await?;

        let wanted = collection.to_string();
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);

        let task = tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(msg) = messages.next().await {
                let name: String = match msg.get_payload() {
                    Ok(name) => name,
                    Err(err) => {
                        warn!(%err, "Undecodable change message, skipping");
                        continue;
                    }
                };
                if name == wanted && tx.send(()).await.is_err() {
                    break; // feed dropped
                }
            }
        });

        debug!(collection, "Document watch opened");
        Ok(ChangeFeed::new(rx, Some(task)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
// Connected behavior is covered by the adapter contract tests against the
// local store; here we pin the key layout that account isolation rests on.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout_carries_account() {
        assert_eq!(
            collection_key("acct-1", "inventory"),
            "vyapar:acct-1:inventory"
        );
        assert_eq!(change_channel("acct-1"), "vyapar:acct-1:changes");
        assert_ne!(
            collection_key("acct-1", "inventory"),
            collection_key("acct-2", "inventory")
        );
    }
}
