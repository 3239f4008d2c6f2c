//! # Stock Ledger
//!
//! Posts sale and purchase documents and keeps the serial-number sets that
//! ARE the stock counts consistent with them.
//!
//! ## Posting Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       post_invoice / post_purchase                      │
//! │                                                                         │
//! │   1. Fresh inventory snapshot from the active store                    │
//! │   2. Validate EVERY line against it - all-or-nothing, no writes yet    │
//! │   3. Write the document itself                                         │
//! │   4. One consolidated inventory write PER ITEM (not per line)          │
//! │                                                                         │
//! │   A validation failure in step 2 touches nothing.                      │
//! │   A failure in step 4 leaves the document standing and reports how     │
//! │   many item writes landed (PartialInventoryUpdate).                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purchase Validation Order
//! Per line, strictly: duplicates within the submitted batch, then overlap
//! with serials queued on other lines of the same bill, then overlap with
//! the item's on-hand set. The operator fixes the nearest problem first.
//!
//! ## Consolidation Rules
//! A purchase line updates its item as follows: serials are appended, the
//! cost price becomes the latest line's price, and the resale price and
//! warranty change only when the line carries a nonzero value for them.
//! Each item is re-read immediately before its write; serials that appeared
//! on hand in the meantime are skipped with a warning instead of
//! duplicated.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use vyapar_core::error::{LedgerError, LedgerResult};
use vyapar_core::serial::{bulk_placeholders, duplicates_within, overlap_with};
use vyapar_core::types::{collections, InventoryItem, Invoice, Purchase, PurchaseLine};

use crate::adapter::{decode_all, RecordStore, StoredRecord};
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Outcome
// =============================================================================

/// What a successful post did.
#[derive(Debug)]
pub struct PostOutcome {
    /// The stored document (invoice or purchase bill).
    pub document: StoredRecord,
    /// Inventory records written.
    pub items_updated: usize,
}

// =============================================================================
// Helpers
// =============================================================================

/// Serials for a bulk (unserialized) receipt line. The placeholders keep
/// the stock-equals-set-size invariant for items nobody scans.
pub fn bulk_receipt_serials(quantity: i64) -> LedgerResult<Vec<String>> {
    if quantity < 1 {
        return Err(LedgerError::InvalidQuantity { quantity });
    }
    Ok(bulk_placeholders(quantity as usize))
}

fn find_item<'a>(items: &'a [InventoryItem], item_id: &str) -> Option<&'a InventoryItem> {
    items.iter().find(|i| i.id == item_id)
}

/// Groups values per item id, preserving first-seen line order so error
/// reports and writes follow the document top to bottom.
fn group_by_item<T>(pairs: impl IntoIterator<Item = (String, T)>) -> Vec<(String, Vec<T>)> {
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for (id, value) in pairs {
        match groups.iter_mut().find(|(gid, _)| *gid == id) {
            Some((_, values)) => values.push(value),
            None => groups.push((id, vec![value])),
        }
    }
    groups
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Posts documents against whichever store the provider selector handed
/// out.
pub struct StockLedger {
    store: Arc<dyn RecordStore>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        StockLedger { store }
    }

    async fn inventory(&self) -> StoreResult<Vec<InventoryItem>> {
        let records = self.store.list(collections::INVENTORY).await?;
        decode_all(&records)
    }

    // -------------------------------------------------------------------------
    // Invoices
    // -------------------------------------------------------------------------

    /// Posts a sale. Every serialized line's serial must be on hand for
    /// its item; otherwise the whole invoice is rejected and nothing is
    /// written.
    pub async fn post_invoice(&self, invoice: &Invoice) -> StoreResult<PostOutcome> {
        let items = self.inventory().await?;

        // A serial can leave stock once, so it may appear on one line only.
        let picked: Vec<String> = invoice
            .lines
            .iter()
            .filter_map(|l| l.serial_number.clone())
            .collect();
        let dupes = duplicates_within(&picked);
        if !dupes.is_empty() {
            return Err(LedgerError::DuplicateSerialInDocument { serials: dupes }.into());
        }

        // Validate every allocation before any write.
        let allocations = group_by_item(invoice.lines.iter().filter_map(|l| {
            l.serial_number
                .clone()
                .map(|serial| (l.item_id.clone(), serial))
        }));
        for (item_id, serials) in &allocations {
            let item = find_item(&items, item_id).ok_or_else(|| LedgerError::ItemNotFound {
                item_id: item_id.clone(),
            })?;
            let missing: Vec<String> = serials
                .iter()
                .filter(|s| !item.has_serial(s))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(LedgerError::SerialNotInStock {
                    item_id: item_id.clone(),
                    serials: missing,
                }
                .into());
            }
        }

        // The document first; stock adjustments hang off a committed sale.
        let document = self
            .store
            .create(collections::INVOICES, serde_json::to_value(invoice)?)
            .await?;
        info!(invoice = %invoice.invoice_number, id = %document.id, "Invoice posted");

        let total = allocations.len();
        let mut updated = 0;
        for (item_id, serials) in &allocations {
            // Validated above, so the item is present.
            let Some(item) = find_item(&items, item_id) else {
                continue;
            };
            let remaining: Vec<&String> = item
                .serial_numbers
                .iter()
                .filter(|s| !serials.contains(*s))
                .collect();
            let patch = json!({ "serial_numbers": remaining });
            match self.store.update(collections::INVENTORY, item_id, patch).await {
                Ok(()) => {
                    updated += 1;
                    debug!(item_id = %item_id, sold = serials.len(), "Stock reduced");
                }
                Err(err) => warn!(item_id = %item_id, %err, "Inventory update failed"),
            }
        }

        if updated < total {
            return Err(StoreError::PartialInventoryUpdate { updated, total });
        }
        Ok(PostOutcome {
            document,
            items_updated: updated,
        })
    }

    // -------------------------------------------------------------------------
    // Purchases
    // -------------------------------------------------------------------------

    /// Posts a purchase bill, appending each line's serial batch to its
    /// item. Lines with an unknown or blank item id create a fresh
    /// inventory item.
    pub async fn post_purchase(&self, purchase: &Purchase) -> StoreResult<PostOutcome> {
        let items = self.inventory().await?;
        self.validate_purchase(purchase, &items)?;

        let document = self
            .store
            .create(collections::PURCHASES, serde_json::to_value(purchase)?)
            .await?;
        info!(bill = %purchase.bill_number, id = %document.id, "Purchase posted");

        // Consolidate: one write per existing item, one create per new
        // item, regardless of how many lines touched it.
        let existing_groups = group_by_item(
            purchase
                .lines
                .iter()
                .filter(|l| find_item(&items, &l.item_id).is_some())
                .map(|l| (l.item_id.clone(), l)),
        );
        let new_lines: Vec<&PurchaseLine> = purchase
            .lines
            .iter()
            .filter(|l| find_item(&items, &l.item_id).is_none())
            .collect();

        let total = existing_groups.len() + new_lines.len();
        let mut updated = 0;

        for (item_id, lines) in &existing_groups {
            match self.receive_into_item(item_id, lines, &items).await {
                Ok(()) => updated += 1,
                Err(err) => warn!(item_id = %item_id, %err, "Inventory update failed"),
            }
        }

        for line in &new_lines {
            match self.create_item_from_line(line, &purchase.date).await {
                Ok(()) => updated += 1,
                Err(err) => warn!(item = %line.name, %err, "Inventory create failed"),
            }
        }

        if updated < total {
            return Err(StoreError::PartialInventoryUpdate { updated, total });
        }
        Ok(PostOutcome {
            document,
            items_updated: updated,
        })
    }

    /// Per-line validation in fixed order: batch-internal duplicates, then
    /// overlap with the rest of the bill, then overlap with stock on hand.
    fn validate_purchase(&self, purchase: &Purchase, items: &[InventoryItem]) -> LedgerResult<()> {
        for (index, line) in purchase.lines.iter().enumerate() {
            let label = if line.item_id.is_empty() {
                line.name.clone()
            } else {
                line.item_id.clone()
            };

            if line.serial_numbers.is_empty() {
                return Err(LedgerError::EmptyBatch { item_id: label });
            }

            let dupes = duplicates_within(&line.serial_numbers);
            if !dupes.is_empty() {
                return Err(LedgerError::DuplicateSerialInBatch { serials: dupes });
            }

            let elsewhere: Vec<&str> = purchase
                .lines
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .flat_map(|(_, l)| l.serial_numbers.iter().map(String::as_str))
                .collect();
            let in_bill = overlap_with(&line.serial_numbers, elsewhere);
            if !in_bill.is_empty() {
                return Err(LedgerError::SerialAlreadyInBill { serials: in_bill });
            }

            if let Some(item) = find_item(items, &line.item_id) {
                let in_stock = overlap_with(
                    &line.serial_numbers,
                    item.serial_numbers.iter().map(String::as_str),
                );
                if !in_stock.is_empty() {
                    return Err(LedgerError::SerialAlreadyInStock {
                        item_id: line.item_id.clone(),
                        serials: in_stock,
                    });
                }
            }
        }
        Ok(())
    }

    /// Applies one item's consolidated lines. The item is re-read right
    /// before the write; the validation snapshot may be stale by then.
    async fn receive_into_item(
        &self,
        item_id: &str,
        lines: &[&PurchaseLine],
        snapshot: &[InventoryItem],
    ) -> StoreResult<()> {
        let fresh = self.inventory().await?;
        let current = find_item(&fresh, item_id)
            .or_else(|| find_item(snapshot, item_id))
            .ok_or_else(|| LedgerError::ItemNotFound {
                item_id: item_id.to_string(),
            })?;

        if let Some(stale) = find_item(snapshot, item_id) {
            if stale.serial_numbers != current.serial_numbers {
                warn!(item_id, "Item changed between validation and write");
            }
        }

        let mut serials = current.serial_numbers.clone();
        let mut patch = serde_json::Map::new();
        for line in lines {
            for serial in &line.serial_numbers {
                if serials.iter().any(|s| s == serial) {
                    // Arrived on hand since validation; appending it twice
                    // would inflate stock.
                    warn!(item_id, serial = %serial, "Serial already on hand, skipping");
                    continue;
                }
                serials.push(serial.clone());
            }

            // Latest receipt cost always wins.
            patch.insert("purchase_price".into(), serde_json::to_value(line.price)?);
            if let Some(sale_price) = line.sale_price {
                if !sale_price.is_zero() {
                    patch.insert("sale_price".into(), serde_json::to_value(sale_price)?);
                }
            }
            if line.warranty_days != 0 {
                patch.insert("warranty_days".into(), json!(line.warranty_days));
            }
        }
        patch.insert("serial_numbers".into(), serde_json::to_value(&serials)?);

        self.store
            .update(collections::INVENTORY, item_id, serde_json::Value::Object(patch))
            .await?;
        debug!(item_id, on_hand = serials.len(), "Stock received");
        Ok(())
    }

    async fn create_item_from_line(
        &self,
        line: &PurchaseLine,
        date: &chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<()> {
        let item = InventoryItem {
            id: String::new(), // store assigns
            name: line.name.clone(),
            unit: line.unit.clone(),
            purchase_price: line.price,
            sale_price: line.sale_price.unwrap_or(line.price),
            warranty_days: line.warranty_days,
            serial_numbers: line.serial_numbers.clone(),
            date_added: Some(*date),
        };
        let record = self
            .store
            .create(collections::INVENTORY, serde_json::to_value(&item)?)
            .await?;
        debug!(item = %line.name, id = %record.id, "New item stocked");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
