//! # Domain Types
//!
//! Core record types for Vyapar Lite.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │    Invoice      │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  serial set ◄───┼───┤  lines[serial]  │   │  lines[serials] │       │
//! │  │  |set| = stock  │   │  grand total    │   │  grand total    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  CustomerRecord is a convenience cache; invoices COPY its fields at    │
//! │  creation time so historic documents stay stable if it changes later.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Serial-Set Invariant
//! An item's on-hand quantity IS the cardinality of its serial-number set.
//! There is no separate quantity field to drift out of sync; bulk stock is
//! represented by prefixed placeholder serials (see [`crate::serial`]).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};

// =============================================================================
// Collection Names
// =============================================================================

/// Collection names shared by every backend and the backup format.
pub mod collections {
    pub const INVENTORY: &str = "inventory";
    pub const INVOICES: &str = "invoices";
    pub const PURCHASES: &str = "purchases";
    pub const CUSTOMERS: &str = "customers";
    pub const QUOTATIONS: &str = "quotations";
    /// Singleton path for the company settings document.
    pub const SETTINGS: &str = "settings";
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A trackable product. The serial-number set is the authoritative stock.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InventoryItem {
    /// Record id, assigned by the active store on create.
    #[serde(default)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unit of measure ("Pcs", "Nos", ...).
    #[serde(default)]
    pub unit: String,

    /// Cost at last purchase receipt.
    #[serde(default)]
    pub purchase_price: Money,

    /// Current list price.
    #[serde(default)]
    pub sale_price: Money,

    /// Default warranty duration in days; 0 means no warranty.
    #[serde(default)]
    pub warranty_days: u32,

    /// The serial-number set. Order is irrelevant; cardinality is stock.
    #[serde(default)]
    pub serial_numbers: Vec<String>,

    /// When the item record was created.
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// On-hand quantity: always the size of the serial set.
    #[inline]
    pub fn stock_count(&self) -> usize {
        self.serial_numbers.len()
    }

    /// Whether a given serial number is currently on hand.
    pub fn has_serial(&self, serial: &str) -> bool {
        self.serial_numbers.iter().any(|s| s == serial)
    }
}

// =============================================================================
// Customer Record
// =============================================================================

/// A saved party. Purely a convenience cache for filling in sale documents;
/// never mutated by any transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gstin: String,
}

// =============================================================================
// Discount
// =============================================================================

/// A document-level discount applied to the pre-tax subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// A fixed paise amount.
    Fixed(Money),
    /// Percentage of the subtotal (whole percent).
    Percentage(i64),
}

// =============================================================================
// Invoice
// =============================================================================

/// One line of a tax invoice. Serialized units are billed one line each,
/// so quantity is fixed at 1 and the line may carry a concrete serial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// The inventory item this line draws from.
    pub item_id: String,
    /// Name snapshot at billing time.
    pub name: String,
    #[serde(default)]
    pub unit: String,
    /// Unit price at billing time.
    pub price: Money,
    /// Always 1 for serialized invoice lines.
    #[serde(default = "default_qty")]
    pub quantity: i64,
    /// Line subtotal before discount apportionment and tax.
    pub subtotal: Money,
    /// The serial number being sold, when the operator picked one.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Warranty expiry derived from the issue date.
    #[serde(default)]
    pub warranty_end: Option<NaiveDate>,
    /// HSN classification code for the printed document.
    #[serde(default)]
    pub hsn_code: String,
    /// GST rate for this line.
    #[serde(default)]
    pub tax_rate: TaxRate,
}

fn default_qty() -> i64 {
    1
}

/// A tax invoice. Customer fields are copied, not referenced, so the
/// document stays stable if the customer record changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_gstin: String,
    #[serde(default)]
    pub customer_pan: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub discount: Option<Discount>,
    /// The persisted grand total. Reports reconcile to this figure, never
    /// to a re-derivation.
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub challan_no: String,
    #[serde(default)]
    pub challan_date: Option<NaiveDate>,
}

impl Default for InvoiceLine {
    fn default() -> Self {
        InvoiceLine {
            item_id: String::new(),
            name: String::new(),
            unit: String::new(),
            price: Money::zero(),
            quantity: 1,
            subtotal: Money::zero(),
            serial_number: None,
            warranty_end: None,
            hsn_code: String::new(),
            tax_rate: TaxRate::zero(),
        }
    }
}

// DateTime<Utc> has no Default, so the documents get explicit impls
// anchored at the epoch.
impl Default for Invoice {
    fn default() -> Self {
        Invoice {
            id: String::new(),
            invoice_number: String::new(),
            customer_name: String::new(),
            customer_address: String::new(),
            customer_phone: String::new(),
            customer_gstin: String::new(),
            customer_pan: String::new(),
            date: DateTime::<Utc>::UNIX_EPOCH,
            lines: Vec::new(),
            discount: None,
            total_amount: Money::zero(),
            terms: String::new(),
            challan_no: String::new(),
            challan_date: None,
        }
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// One quotation line; quantities are explicit integers, no serials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationLine {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

/// A quotation: no inventory effect, no serial allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    #[serde(default)]
    pub id: String,
    pub quotation_number: String,
    pub customer_name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<QuotationLine>,
    #[serde(default)]
    pub total_amount: Money,
}

impl Default for Quotation {
    fn default() -> Self {
        Quotation {
            id: String::new(),
            quotation_number: String::new(),
            customer_name: String::new(),
            date: DateTime::<Utc>::UNIX_EPOCH,
            lines: Vec::new(),
            total_amount: Money::zero(),
        }
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// One line of a purchase bill.
///
/// `serial_numbers` holds either the operator's batch (serialized mode) or
/// synthesized `BULK-` placeholders (bulk mode); either way the batch size
/// is the received quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    /// Unit cost for this receipt.
    pub price: Money,
    /// New resale price; `None` or zero leaves the item's price untouched.
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub hsn_code: String,
    #[serde(default)]
    pub tax_rate: TaxRate,
    /// Warranty duration for this batch; zero leaves the item untouched.
    #[serde(default)]
    pub warranty_days: u32,
    /// Newly acquired serials (real or bulk placeholders).
    pub serial_numbers: Vec<String>,
    /// Tax on this line (base × rate).
    #[serde(default)]
    pub tax_amount: Money,
    /// Line total including tax.
    #[serde(default)]
    pub subtotal: Money,
}

impl PurchaseLine {
    /// Received quantity: the batch size, by the serial-set invariant.
    #[inline]
    pub fn quantity(&self) -> usize {
        self.serial_numbers.len()
    }
}

/// A purchase bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(default)]
    pub id: String,
    pub bill_number: String,
    pub supplier_name: String,
    #[serde(default)]
    pub payment_terms: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<PurchaseLine>,
    #[serde(default)]
    pub total_amount: Money,
}

impl Default for Purchase {
    fn default() -> Self {
        Purchase {
            id: String::new(),
            bill_number: String::new(),
            supplier_name: String::new(),
            payment_terms: String::new(),
            date: DateTime::<Utc>::UNIX_EPOCH,
            lines: Vec::new(),
            total_amount: Money::zero(),
        }
    }
}

// =============================================================================
// Company Settings
// =============================================================================

/// Dashboard widget visibility flags.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashboardWidgets {
    pub show_summary: bool,
    pub show_chart: bool,
    pub show_low_stock: bool,
    pub show_sync_card: bool,
    pub show_inventory: bool,
}

/// Singleton per account: business identity, branding, and banking details
/// printed on documents.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompanySettings {
    pub name: String,
    pub gstin: String,
    pub pan: String,
    pub address: String,
    pub phone: String,
    pub logo_url: String,
    pub business_details: String,
    pub theme: String,
    pub bank_name: String,
    pub bank_branch: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub msme_no: String,
    pub dashboard: DashboardWidgets,
}

// =============================================================================
// Derivations
// =============================================================================

/// Warranty expiry: issue date plus the warranty duration.
///
/// Zero days means "No Warranty" and yields `None`; the printable layer
/// renders that wording.
pub fn warranty_end_date(issue: NaiveDate, warranty_days: u32) -> Option<NaiveDate> {
    if warranty_days == 0 {
        return None;
    }
    issue.checked_add_signed(Duration::days(warranty_days as i64))
}

/// Next document number in a sequence: scans the trailing digits of every
/// existing number, takes the max, and formats max+1 with the given
/// prefix/suffix (e.g. `PBL-0042`, `GB/17/24-25`).
///
/// Non-numeric or digit-free numbers are skipped, so a hand-typed oddball
/// never wedges the sequence.
pub fn next_sequence_number<'a, I>(existing: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(trailing_digits)
        .max()
        .unwrap_or(0);
    max + 1
}

fn trailing_digits(s: &str) -> Option<u64> {
    let digits: String = s
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
