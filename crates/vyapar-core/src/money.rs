//! # Money Module
//!
//! Monetary values in integer paise and GST rates in basis points.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹10.00 = 1000 paise. Every total, discount, and tax figure is an    │
//! │    i64 paise value; rounding happens exactly once, where we choose.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vyapar_core::money::{Money, TaxRate};
//!
//! let price = Money::from_paise(1099); // ₹10.99
//! let rate = TaxRate::from_percent(18);
//! assert_eq!(price.tax(rate).paise(), 198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate in basis points (1 bp = 0.01%). 1800 bps = 18%.
///
/// The slab values sold through the UI are 0 / 5 / 12 / 18 / 28 percent, but
/// the type accepts any rate up to 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole percentage (18 → 18%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        TaxRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in paise (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and corrections can go negative
/// - **Single-field tuple struct**: zero-cost wrapper over i64
/// - **i128 widening**: intermediate tax/discount products cannot overflow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated towards zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// Used when a fixed discount exceeds the subtotal: the taxable amount
    /// floors at zero rather than going negative.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies by an integer quantity.
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Tax on this amount at the given rate, rounded half-up.
    ///
    /// Integer math: `(paise * bps + 5000) / 10000`, widened to i128 so
    /// large invoice totals cannot overflow the intermediate product.
    pub fn tax(&self, rate: TaxRate) -> Money {
        let t = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(t as i64)
    }

    /// Percentage of this amount (half-up). `percent_of(10)` is 10%.
    pub fn percent_of(&self, pct: i64) -> Money {
        let p = (self.0 as i128 * pct as i128 + 50) / 100;
        Money(p as i64)
    }

    /// Apportions this amount by the ratio `numerator / denominator`.
    ///
    /// Used to spread a document-level discount across lines pro-rata:
    /// the line's taxable base is `line_subtotal × taxable / subtotal`.
    /// Returns zero when the denominator is zero or negative.
    pub fn apportion(&self, numerator: Money, denominator: Money) -> Money {
        if denominator.0 <= 0 {
            return Money::zero();
        }
        let scaled = self.0 as i128 * numerator.0 as i128;
        // Round half-up against the denominator.
        let half = denominator.0 as i128 / 2;
        Money(((scaled + half) / denominator.0 as i128) as i64)
    }

    /// Rounds to the nearest whole rupee (half-up). Used for the printed
    /// amount-in-words figure.
    pub fn round_to_rupees(&self) -> i64 {
        if self.0 >= 0 {
            (self.0 + 50) / 100
        } else {
            (self.0 - 50) / 100
        }
    }
}

// =============================================================================
// Tax Split
// =============================================================================

/// A line's GST amount split into its two co-equal components (CGST/SGST).
///
/// The split is for display on printed documents; arithmetic always runs on
/// the combined figure so the halves reconcile exactly: `cgst + sgst == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxSplit {
    pub cgst: Money,
    pub sgst: Money,
}

impl TaxSplit {
    /// Splits a tax amount into two equal halves; an odd paise lands on SGST.
    pub fn halve(total: Money) -> Self {
        let cgst = Money::from_paise(total.paise() / 2);
        let sgst = total - cgst;
        TaxSplit { cgst, sgst }
    }

    /// Combined tax amount.
    #[inline]
    pub fn total(&self) -> Money {
        self.cgst + self.sgst
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display; UI formatting (locale grouping) happens upstream.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let m = Money::from_paise(1099);
        assert_eq!(m.paise(), 1099);
        assert_eq!(m.rupees(), 10);
        assert_eq!(m.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1099)), "₹10.99");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_tax_whole_slab() {
        // ₹900.00 at 18% = ₹162.00 exactly
        let taxable = Money::from_rupees(900);
        assert_eq!(taxable.tax(TaxRate::from_percent(18)).paise(), 16200);
    }

    #[test]
    fn test_tax_rounding() {
        // ₹10.99 at 18% = ₹1.9782 → ₹1.98
        let m = Money::from_paise(1099);
        assert_eq!(m.tax(TaxRate::from_percent(18)).paise(), 198);
    }

    #[test]
    fn test_percent_of() {
        let subtotal = Money::from_rupees(1000);
        assert_eq!(subtotal.percent_of(10), Money::from_rupees(100));
    }

    #[test]
    fn test_apportion() {
        // 900 / 1000 ratio applied to a 400 line = 360
        let line = Money::from_rupees(400);
        let taxable = Money::from_rupees(900);
        let subtotal = Money::from_rupees(1000);
        assert_eq!(line.apportion(taxable, subtotal), Money::from_rupees(360));
    }

    #[test]
    fn test_apportion_zero_denominator() {
        let line = Money::from_rupees(400);
        assert_eq!(line.apportion(Money::zero(), Money::zero()), Money::zero());
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_paise(-1).clamp_non_negative(), Money::zero());
        assert_eq!(
            Money::from_paise(5).clamp_non_negative(),
            Money::from_paise(5)
        );
    }

    #[test]
    fn test_round_to_rupees() {
        assert_eq!(Money::from_paise(106200).round_to_rupees(), 1062);
        assert_eq!(Money::from_paise(149).round_to_rupees(), 1);
        assert_eq!(Money::from_paise(150).round_to_rupees(), 2);
    }

    #[test]
    fn test_tax_split_reconciles() {
        let tax = Money::from_paise(333);
        let split = TaxSplit::halve(tax);
        assert_eq!(split.cgst.paise(), 166);
        assert_eq!(split.sgst.paise(), 167);
        assert_eq!(split.total(), tax);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .into_iter()
            .map(Money::from_paise)
            .sum();
        assert_eq!(total.paise(), 600);
    }
}
