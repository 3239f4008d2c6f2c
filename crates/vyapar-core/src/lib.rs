//! # vyapar-core: Pure Business Logic for Vyapar Lite
//!
//! This crate is the **heart** of Vyapar Lite. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Vyapar Lite Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       Application / UI                          │   │
//! │  │   Inventory ──► New Invoice ──► New Purchase ──► Reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vyapar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  types  │ │  money  │ │ totals  │ │ serial  │ │  words  │ │   │
//! │  │   │ Invoice │ │  Money  │ │ pro-rata│ │ batches │ │  lakh/  │ │   │
//! │  │   │Purchase │ │ TaxSplit│ │ discount│ │  dupes  │ │  crore  │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 vyapar-store (Persistence Layer)                │   │
//! │  │       SQLite / Redis / Postgres adapters, live collections      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Invoice, Purchase, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Document totals: pro-rata discount, GST split, grand total
//! - [`serial`] - Serial-number parsing, generation, duplicate detection
//! - [`words`] - Amount-in-words with Indian lakh/crore grouping
//! - [`export`] - CSV report rows and the JSON backup bundle
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use vyapar_core::money::{Money, TaxRate};
//! use vyapar_core::totals::{document_totals, LineAmount};
//! use vyapar_core::types::Discount;
//!
//! // One line of ₹1000 at 18% GST with a 10% document discount.
//! let lines = vec![LineAmount::priced(
//!     Money::from_rupees(1000),
//!     1,
//!     TaxRate::from_percent(18),
//! )];
//! let totals = document_totals(&lines, Some(Discount::Percentage(10)));
//!
//! assert_eq!(totals.taxable_amount, Money::from_rupees(900));
//! assert_eq!(totals.total_tax, Money::from_rupees(162));
//! assert_eq!(totals.grand_total, Money::from_rupees(1062));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod money;
pub mod serial;
pub mod totals;
pub mod types;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vyapar_core::Money` instead of
// `use vyapar_core::money::Money`

pub use error::{LedgerError, LedgerResult};
pub use money::{Money, TaxRate, TaxSplit};
pub use totals::{document_totals, DocumentTotals, LineAmount};
pub use types::*;
