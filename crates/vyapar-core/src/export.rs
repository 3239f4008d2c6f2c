//! # Export Formats
//!
//! CSV encoding for report downloads and the JSON backup bundle.
//!
//! ## CSV Rules
//! Header row first, comma-delimited. A field containing a comma, a double
//! quote, or a newline is wrapped in double quotes with inner quotes
//! doubled. Everything else is written bare. These rules are pinned by the
//! report consumers (spreadsheet imports), so no CSV library sits between
//! us and them.
//!
//! ## Backup Bundle
//! One JSON object keyed by collection name:
//! `inventory`, `invoices`, `purchases`, `customers`, `quotations`,
//! `settings`: each value the full array (or the settings record) for that
//! collection. Used for manual export/import between providers.

use serde::{Deserialize, Serialize};

use crate::types::{CompanySettings, CustomerRecord, InventoryItem, Invoice, Purchase, Quotation};

// =============================================================================
// CSV Encoding
// =============================================================================

/// Encodes rows (header included by the caller) as CSV text.
pub fn csv_encode<R, F>(rows: R) -> String
where
    R: IntoIterator<Item = F>,
    F: IntoIterator<Item = String>,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|field| csv_field(&field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quotes a single field when it needs quoting, doubling inner quotes.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// =============================================================================
// Report Rows
// =============================================================================

/// Sales register: one row per invoice.
pub fn sales_register_rows(invoices: &[Invoice]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Invoice No".to_string(),
        "Date".to_string(),
        "Customer".to_string(),
        "GSTIN".to_string(),
        "Items".to_string(),
        "Total".to_string(),
    ]];
    for inv in invoices {
        rows.push(vec![
            inv.invoice_number.clone(),
            inv.date.date_naive().to_string(),
            inv.customer_name.clone(),
            inv.customer_gstin.clone(),
            inv.lines.len().to_string(),
            format!("{:.2}", inv.total_amount.paise() as f64 / 100.0),
        ]);
    }
    rows
}

/// Purchase register: one row per bill.
pub fn purchase_register_rows(purchases: &[Purchase]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Bill No".to_string(),
        "Date".to_string(),
        "Supplier".to_string(),
        "Items".to_string(),
        "Total".to_string(),
    ]];
    for p in purchases {
        rows.push(vec![
            p.bill_number.clone(),
            p.date.date_naive().to_string(),
            p.supplier_name.clone(),
            p.lines.len().to_string(),
            format!("{:.2}", p.total_amount.paise() as f64 / 100.0),
        ]);
    }
    rows
}

/// Stock summary: one row per item, quantity from the serial-set invariant.
pub fn stock_summary_rows(items: &[InventoryItem]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Item".to_string(),
        "Unit".to_string(),
        "In Stock".to_string(),
        "Purchase Price".to_string(),
        "Sale Price".to_string(),
    ]];
    for item in items {
        rows.push(vec![
            item.name.clone(),
            item.unit.clone(),
            item.stock_count().to_string(),
            format!("{:.2}", item.purchase_price.paise() as f64 / 100.0),
            format!("{:.2}", item.sale_price.paise() as f64 / 100.0),
        ]);
    }
    rows
}

/// Stock detail: one row per serial number on hand.
pub fn stock_detail_rows(items: &[InventoryItem]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Item".to_string(),
        "Serial Number".to_string(),
        "Purchase Price".to_string(),
    ]];
    for item in items {
        for serial in &item.serial_numbers {
            rows.push(vec![
                item.name.clone(),
                serial.clone(),
                format!("{:.2}", item.purchase_price.paise() as f64 / 100.0),
            ]);
        }
    }
    rows
}

// =============================================================================
// Backup Bundle
// =============================================================================

/// The full-account backup document: every collection plus the settings
/// singleton, keyed by collection name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackupBundle {
    pub inventory: Vec<InventoryItem>,
    pub invoices: Vec<Invoice>,
    pub purchases: Vec<Purchase>,
    pub customers: Vec<CustomerRecord>,
    pub quotations: Vec<Quotation>,
    pub settings: Option<CompanySettings>,
}

impl BackupBundle {
    /// Total record count across collections (settings counts as one).
    pub fn record_count(&self) -> usize {
        self.inventory.len()
            + self.invoices.len()
            + self.purchases.len()
            + self.customers.len()
            + self.quotations.len()
            + usize::from(self.settings.is_some())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_csv_plain_fields() {
        let out = csv_encode(rows(&[&["a", "b"], &["1", "2"]]));
        assert_eq!(out, "a,b\n1,2");
    }

    #[test]
    fn test_csv_quoting_rules() {
        let out = csv_encode(rows(&[&["has,comma", "has\"quote", "has\nnewline", "plain"]]));
        assert_eq!(out, "\"has,comma\",\"has\"\"quote\",\"has\nnewline\",plain");
    }

    #[test]
    fn test_stock_summary_uses_set_cardinality() {
        let items = vec![InventoryItem {
            name: "Mixer, Grinder".into(),
            unit: "Pcs".into(),
            sale_price: Money::from_rupees(3500),
            serial_numbers: vec!["S1".into(), "S2".into()],
            ..Default::default()
        }];
        let rows = stock_summary_rows(&items);
        assert_eq!(rows[0][0], "Item");
        assert_eq!(rows[1][2], "2");
        // The comma in the name survives encoding intact.
        let csv = csv_encode(rows);
        assert!(csv.contains("\"Mixer, Grinder\""));
    }

    #[test]
    fn test_stock_detail_row_per_serial() {
        let items = vec![InventoryItem {
            name: "Fan".into(),
            serial_numbers: vec!["S1".into(), "S2".into(), "S3".into()],
            ..Default::default()
        }];
        let rows = stock_detail_rows(&items);
        assert_eq!(rows.len(), 4); // header + one per serial
        assert_eq!(rows[2][1], "S2");
    }

    #[test]
    fn test_backup_bundle_roundtrip() {
        let bundle = BackupBundle {
            inventory: vec![InventoryItem {
                name: "Fan".into(),
                serial_numbers: vec!["S1".into()],
                ..Default::default()
            }],
            settings: Some(CompanySettings {
                name: "Smart Electronics".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(bundle.record_count(), 2);

        let json = serde_json::to_string(&bundle).unwrap();
        let back: BackupBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.inventory[0].name, "Fan");
        assert_eq!(back.settings.unwrap().name, "Smart Electronics");
    }

    #[test]
    fn test_backup_bundle_tolerates_missing_keys() {
        let back: BackupBundle = serde_json::from_str(r#"{"inventory":[]}"#).unwrap();
        assert_eq!(back.record_count(), 0);
    }
}
