//! # Error Types
//!
//! Domain-specific error types for vyapar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vyapar-core errors (this file)                                        │
//! │  └── LedgerError  - Stock-ledger rule violations (with offenders)      │
//! │                                                                         │
//! │  vyapar-store errors (separate crate)                                  │
//! │  └── StoreError   - Backend failures, wraps LedgerError                │
//! │                                                                         │
//! │  Flow: LedgerError → StoreError → caller (UI shows the offenders)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derives, never manual impls
//! 2. Every ledger variant carries the exact conflicting serial numbers so
//!    the operator can fix the input without guessing
//! 3. Errors are enum variants, never bare strings

use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Stock-ledger rule violations.
///
/// All of these are synchronous, pre-commit rejections: when one is raised,
/// nothing has been written yet. Post-commit inventory failures are reported
/// by the store crate's `PartialInventoryUpdate`, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The same serial number appears on two lines of one invoice.
    #[error("serial number(s) used on more than one line of this invoice: {}", serials.join(", "))]
    DuplicateSerialInDocument { serials: Vec<String> },

    /// An invoice line names a serial the item does not currently hold.
    #[error("serial number(s) not in stock for item {item_id}: {}", serials.join(", "))]
    SerialNotInStock {
        item_id: String,
        serials: Vec<String>,
    },

    /// A submitted purchase batch repeats a serial within itself.
    #[error("duplicate serial number(s) in the submitted batch: {}", serials.join(", "))]
    DuplicateSerialInBatch { serials: Vec<String> },

    /// A purchase batch overlaps serials already queued on another line of
    /// the same bill.
    #[error("serial number(s) already added elsewhere in this bill: {}", serials.join(", "))]
    SerialAlreadyInBill { serials: Vec<String> },

    /// A purchase batch overlaps the item's existing on-hand set.
    #[error("serial number(s) already exist in stock for item {item_id}: {}", serials.join(", "))]
    SerialAlreadyInStock {
        item_id: String,
        serials: Vec<String>,
    },

    /// A bulk receipt line with a non-positive quantity.
    #[error("quantity must be at least 1, got {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// A serialized receipt line with an empty batch.
    #[error("no serial numbers supplied for item {item_id}")]
    EmptyBatch { item_id: String },

    /// A document line references an item id that is not in inventory.
    #[error("inventory item not found: {item_id}")]
    ItemNotFound { item_id: String },
}

// =============================================================================
// Result Alias
// =============================================================================

pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_names_offenders() {
        let err = LedgerError::SerialAlreadyInStock {
            item_id: "item-7".to_string(),
            serials: vec!["SN1".to_string(), "SN2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "serial number(s) already exist in stock for item item-7: SN1, SN2"
        );
    }

    #[test]
    fn test_invalid_quantity_message() {
        let err = LedgerError::InvalidQuantity { quantity: 0 };
        assert_eq!(err.to_string(), "quantity must be at least 1, got 0");
    }
}
