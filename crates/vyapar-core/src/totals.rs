//! # Commerce Calculator
//!
//! Deterministic totals for invoices, quotations, and purchase bills.
//! Shared by document creation and document display so the two can never
//! disagree; the grand total computed here is what gets persisted.
//!
//! ## Discount Apportionment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A document-level discount is spread across lines PRO-RATA, then tax   │
//! │  is computed per line on the discounted base:                          │
//! │                                                                         │
//! │  subtotal            = Σ line subtotal                                 │
//! │  discount            = fixed value | subtotal × pct/100                │
//! │  taxable             = max(0, subtotal − discount)                     │
//! │  line tax base       = line subtotal × taxable / subtotal              │
//! │  line tax            = line tax base × rate/100   (CGST+SGST halves)   │
//! │  grand total         = taxable + Σ line tax                            │
//! │                                                                         │
//! │  Example: subtotal 1000, 10% discount, 18% GST                         │
//! │           taxable 900, tax 162, grand total 1062                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! These functions never panic. Malformed input (negative prices, empty
//! line lists, out-of-range discounts) degrades to zero/empty results; the
//! ledger and the UI validate before anything is persisted.

use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate, TaxSplit};
use crate::types::Discount;

// =============================================================================
// Line Input
// =============================================================================

/// The slice of a document line the calculator needs.
#[derive(Debug, Clone, Copy)]
pub struct LineAmount {
    /// Line subtotal before discount and tax (unit price × quantity).
    pub subtotal: Money,
    /// GST rate for this line.
    pub tax_rate: TaxRate,
}

impl LineAmount {
    /// Builds a line amount from unit price and quantity; quantity defaults
    /// to 1 when non-positive (each serialized invoice unit is one line).
    pub fn priced(price: Money, quantity: i64, tax_rate: TaxRate) -> Self {
        let qty = if quantity > 0 { quantity } else { 1 };
        LineAmount {
            subtotal: price.clamp_non_negative().times(qty),
            tax_rate,
        }
    }
}

// =============================================================================
// Document Totals
// =============================================================================

/// Computed totals for one document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentTotals {
    /// Σ line subtotal, before discount.
    pub subtotal: Money,
    /// The discount actually applied (clamped to the subtotal).
    pub discount_amount: Money,
    /// Subtotal after discount; the tax base. Never negative.
    pub taxable_amount: Money,
    /// Per-line tax, split into CGST/SGST halves, in line order.
    pub line_taxes: Vec<TaxSplit>,
    /// Σ line tax.
    pub total_tax: Money,
    /// taxable + total tax. THIS figure persists; reports reconcile to it.
    pub grand_total: Money,
}

/// Computes totals for a line list with an optional document discount.
pub fn document_totals(lines: &[LineAmount], discount: Option<Discount>) -> DocumentTotals {
    let subtotal: Money = lines
        .iter()
        .map(|l| l.subtotal.clamp_non_negative())
        .sum();

    let discount_amount = discount_amount(subtotal, discount);
    let taxable_amount = (subtotal - discount_amount).clamp_non_negative();

    // Pro-rata: each line's tax base is its share of the taxable amount.
    let line_taxes: Vec<TaxSplit> = lines
        .iter()
        .map(|l| {
            let base = l
                .subtotal
                .clamp_non_negative()
                .apportion(taxable_amount, subtotal);
            TaxSplit::halve(base.tax(l.tax_rate))
        })
        .collect();

    let total_tax: Money = line_taxes.iter().map(|t| t.total()).sum();

    DocumentTotals {
        subtotal,
        discount_amount,
        taxable_amount,
        grand_total: taxable_amount + total_tax,
        line_taxes,
        total_tax,
    }
}

/// The discount amount for a subtotal, clamped so the taxable amount can
/// never go negative. Negative discount inputs are treated as zero.
fn discount_amount(subtotal: Money, discount: Option<Discount>) -> Money {
    let raw = match discount {
        None => Money::zero(),
        Some(Discount::Fixed(amount)) => amount.clamp_non_negative(),
        Some(Discount::Percentage(pct)) => {
            if pct <= 0 {
                Money::zero()
            } else {
                subtotal.percent_of(pct.min(100))
            }
        }
    };
    if raw > subtotal {
        subtotal
    } else {
        raw
    }
}

/// Totals for one purchase line: (base, tax, line total including tax).
///
/// Purchase bills carry no document-level discount, so the line's tax base
/// is simply cost × quantity.
pub fn purchase_line_totals(price: Money, quantity: usize, tax_rate: TaxRate) -> (Money, Money, Money) {
    let base = price.clamp_non_negative().times(quantity as i64);
    let tax = base.tax(tax_rate);
    (base, tax, base + tax)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn one_line(rupees: i64, pct: u32) -> Vec<LineAmount> {
        vec![LineAmount {
            subtotal: Money::from_rupees(rupees),
            tax_rate: TaxRate::from_percent(pct),
        }]
    }

    #[test]
    fn test_percentage_discount_reference_figures() {
        // subtotal 1000, 10% discount, 18% GST → taxable 900, tax 162, grand 1062
        let totals = document_totals(&one_line(1000, 18), Some(Discount::Percentage(10)));
        assert_eq!(totals.subtotal, Money::from_rupees(1000));
        assert_eq!(totals.discount_amount, Money::from_rupees(100));
        assert_eq!(totals.taxable_amount, Money::from_rupees(900));
        assert_eq!(totals.total_tax, Money::from_rupees(162));
        assert_eq!(totals.grand_total, Money::from_rupees(1062));
    }

    #[test]
    fn test_fixed_discount_reference_figures() {
        // subtotal 1000, fixed 50 off, 18% GST → taxable 950, tax 171, grand 1121
        let totals = document_totals(
            &one_line(1000, 18),
            Some(Discount::Fixed(Money::from_rupees(50))),
        );
        assert_eq!(totals.taxable_amount, Money::from_rupees(950));
        assert_eq!(totals.total_tax, Money::from_rupees(171));
        assert_eq!(totals.grand_total, Money::from_rupees(1121));
    }

    #[test]
    fn test_pro_rata_apportionment_across_lines() {
        // Two lines 600 + 400, 10% discount, both 18%:
        // taxable 900; bases 540 and 360; taxes 97.20 + 64.80 = 162.
        let lines = vec![
            LineAmount {
                subtotal: Money::from_rupees(600),
                tax_rate: TaxRate::from_percent(18),
            },
            LineAmount {
                subtotal: Money::from_rupees(400),
                tax_rate: TaxRate::from_percent(18),
            },
        ];
        let totals = document_totals(&lines, Some(Discount::Percentage(10)));
        assert_eq!(totals.line_taxes[0].total(), Money::from_paise(9720));
        assert_eq!(totals.line_taxes[1].total(), Money::from_paise(6480));
        assert_eq!(totals.total_tax, Money::from_rupees(162));
        assert_eq!(totals.grand_total, Money::from_rupees(1062));
    }

    #[test]
    fn test_grand_total_is_taxable_plus_line_taxes() {
        // Mixed rates and an awkward discount; the identity must still hold
        // because the grand total is defined from the parts, not re-derived.
        let lines = vec![
            LineAmount {
                subtotal: Money::from_paise(33_333),
                tax_rate: TaxRate::from_percent(18),
            },
            LineAmount {
                subtotal: Money::from_paise(66_667),
                tax_rate: TaxRate::from_percent(5),
            },
        ];
        let totals = document_totals(&lines, Some(Discount::Fixed(Money::from_paise(7_777))));
        let line_sum: Money = totals.line_taxes.iter().map(|t| t.total()).sum();
        assert_eq!(totals.total_tax, line_sum);
        assert_eq!(totals.grand_total, totals.taxable_amount + line_sum);
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let totals = document_totals(
            &one_line(100, 18),
            Some(Discount::Fixed(Money::from_rupees(500))),
        );
        assert_eq!(totals.taxable_amount, Money::zero());
        assert_eq!(totals.total_tax, Money::zero());
        assert_eq!(totals.grand_total, Money::zero());
    }

    #[test]
    fn test_malformed_input_degrades_to_zero() {
        // Negative line amounts and a negative discount never panic.
        let lines = vec![LineAmount {
            subtotal: Money::from_rupees(-50),
            tax_rate: TaxRate::from_percent(18),
        }];
        let totals = document_totals(&lines, Some(Discount::Percentage(-10)));
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.grand_total, Money::zero());

        let empty = document_totals(&[], Some(Discount::Percentage(10)));
        assert_eq!(empty.grand_total, Money::zero());
        assert!(empty.line_taxes.is_empty());
    }

    #[test]
    fn test_no_discount() {
        let totals = document_totals(&one_line(1000, 18), None);
        assert_eq!(totals.taxable_amount, Money::from_rupees(1000));
        assert_eq!(totals.grand_total, Money::from_rupees(1180));
    }

    #[test]
    fn test_purchase_line_totals() {
        let (base, tax, total) =
            purchase_line_totals(Money::from_rupees(500), 4, TaxRate::from_percent(18));
        assert_eq!(base, Money::from_rupees(2000));
        assert_eq!(tax, Money::from_rupees(360));
        assert_eq!(total, Money::from_rupees(2360));
    }

    #[test]
    fn test_priced_defaults_quantity_to_one() {
        let line = LineAmount::priced(Money::from_rupees(10), 0, TaxRate::zero());
        assert_eq!(line.subtotal, Money::from_rupees(10));
    }
}
