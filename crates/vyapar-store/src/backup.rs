//! # Backup Export / Import
//!
//! Moves a whole account between backends as one JSON bundle. Providers do
//! not sync with each other; this explicit export/import is the only data
//! path between them.
//!
//! Import replays records through [`RecordStore::create`], so the target
//! store assigns fresh ids. Cross-record references travel inside the
//! documents themselves (invoices copy their customer fields, purchase
//! lines carry their serials), so re-keying is safe.

use serde_json::Value;
use tracing::info;

use vyapar_core::export::BackupBundle;
use vyapar_core::types::collections;

use crate::adapter::{decode_all, RecordStore};
use crate::error::StoreResult;

/// Reads every collection plus the settings singleton into a bundle.
pub async fn export_backup(store: &dyn RecordStore) -> StoreResult<BackupBundle> {
    let bundle = BackupBundle {
        inventory: decode_all(&store.list(collections::INVENTORY).await?)?,
        invoices: decode_all(&store.list(collections::INVOICES).await?)?,
        purchases: decode_all(&store.list(collections::PURCHASES).await?)?,
        customers: decode_all(&store.list(collections::CUSTOMERS).await?)?,
        quotations: decode_all(&store.list(collections::QUOTATIONS).await?)?,
        settings: match store.read_singleton(collections::SETTINGS).await? {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        },
    };
    info!(records = bundle.record_count(), "Backup exported");
    Ok(bundle)
}

/// Replays a bundle into the store. Returns the number of records written.
pub async fn import_backup(store: &dyn RecordStore, bundle: &BackupBundle) -> StoreResult<usize> {
    let mut written = 0;

    written += replay(store, collections::INVENTORY, &bundle.inventory).await?;
    written += replay(store, collections::INVOICES, &bundle.invoices).await?;
    written += replay(store, collections::PURCHASES, &bundle.purchases).await?;
    written += replay(store, collections::CUSTOMERS, &bundle.customers).await?;
    written += replay(store, collections::QUOTATIONS, &bundle.quotations).await?;

    if let Some(settings) = &bundle.settings {
        store
            .write_singleton(collections::SETTINGS, serde_json::to_value(settings)?)
            .await?;
        written += 1;
    }

    info!(records = written, "Backup imported");
    Ok(written)
}

async fn replay<T: serde::Serialize>(
    store: &dyn RecordStore,
    collection: &str,
    records: &[T],
) -> StoreResult<usize> {
    for record in records {
        let payload: Value = serde_json::to_value(record)?;
        store.create(collection, payload).await?;
    }
    Ok(records.len())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{LocalConfig, LocalStore};
    use serde_json::json;
    use vyapar_core::types::{CompanySettings, InventoryItem};

    async fn store(account: &str) -> LocalStore {
        crate::test_support::init_tracing();
        LocalStore::connect(LocalConfig::in_memory(), account)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_backup_roundtrip_between_stores() {
        let source = store("acct-a").await;
        source
            .create(
                collections::INVENTORY,
                json!({"name": "Fan", "serial_numbers": ["S1", "S2"]}),
            )
            .await
            .unwrap();
        source
            .create(collections::CUSTOMERS, json!({"name": "M/s Sharma Traders"}))
            .await
            .unwrap();
        source
            .write_singleton(
                collections::SETTINGS,
                serde_json::to_value(CompanySettings {
                    name: "Smart Electronics".to_string(),
                    ..Default::default()
                })
                .unwrap(),
            )
            .await
            .unwrap();

        let bundle = export_backup(&source).await.unwrap();
        assert_eq!(bundle.record_count(), 3);

        // A second store plays the part of the newly selected provider.
        let target = store("acct-b").await;
        let written = import_backup(&target, &bundle).await.unwrap();
        assert_eq!(written, 3);

        let items = target.list(collections::INVENTORY).await.unwrap();
        assert_eq!(items.len(), 1);
        let item: InventoryItem = items[0].decode().unwrap();
        assert_eq!(item.name, "Fan");
        assert_eq!(item.stock_count(), 2);

        let settings = target
            .read_singleton(collections::SETTINGS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settings["name"], "Smart Electronics");
    }

    #[tokio::test]
    async fn test_empty_store_exports_empty_bundle() {
        let source = store("acct-a").await;
        let bundle = export_backup(&source).await.unwrap();
        assert_eq!(bundle.record_count(), 0);
        assert!(bundle.settings.is_none());
    }

    #[tokio::test]
    async fn test_import_assigns_fresh_ids() {
        let source = store("acct-a").await;
        let created = source
            .create(collections::INVENTORY, json!({"name": "Fan"}))
            .await
            .unwrap();

        let bundle = export_backup(&source).await.unwrap();
        let target = store("acct-b").await;
        import_backup(&target, &bundle).await.unwrap();

        let items = target.list(collections::INVENTORY).await.unwrap();
        assert_ne!(items[0].id, created.id);
        assert_eq!(items[0].payload["id"], items[0].id.as_str());
    }
}
