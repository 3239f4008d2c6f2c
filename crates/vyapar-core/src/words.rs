//! # Amount In Words
//!
//! Deterministic integer-to-words conversion for printed documents, using
//! Indian grouping: hundred, thousand, lakh (1,00,000), crore (1,00,00,000).
//!
//! ```rust
//! use vyapar_core::words::number_to_words;
//!
//! assert_eq!(number_to_words(1062), "One Thousand Sixty Two");
//! assert_eq!(number_to_words(100000), "One Lakh");
//! ```

use crate::money::Money;

const UNITS: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Converts a non-negative integer to English words with Indian grouping.
/// Zero is "Zero".
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    convert(n)
}

fn convert(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=19 => UNITS[n as usize].to_string(),
        20..=99 => join(TENS[(n / 10) as usize], convert(n % 10)),
        100..=999 => join(&format!("{} Hundred", UNITS[(n / 100) as usize]), convert(n % 100)),
        1_000..=99_999 => join(&format!("{} Thousand", convert(n / 1_000)), convert(n % 1_000)),
        100_000..=9_999_999 => {
            join(&format!("{} Lakh", convert(n / 100_000)), convert(n % 100_000))
        }
        _ => join(
            &format!("{} Crore", convert(n / 10_000_000)),
            convert(n % 10_000_000),
        ),
    }
}

fn join(head: &str, tail: String) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head} {tail}")
    }
}

/// The grand-total line for printed documents: the amount rounded to the
/// nearest whole rupee, in words, with the currency suffix. Zero and
/// negative amounts render as plain "Zero" with no suffix.
pub fn amount_in_words(amount: Money) -> String {
    let rupees = amount.round_to_rupees();
    if rupees <= 0 {
        return "Zero".to_string();
    }
    format!("{} Rupees Only", number_to_words(rupees as u64))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(number_to_words(0), "Zero");
        assert_eq!(amount_in_words(Money::zero()), "Zero");
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(number_to_words(7), "Seven");
        assert_eq!(number_to_words(19), "Nineteen");
        assert_eq!(number_to_words(42), "Forty Two");
        assert_eq!(number_to_words(90), "Ninety");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(number_to_words(100), "One Hundred");
        assert_eq!(number_to_words(999), "Nine Hundred Ninety Nine");
    }

    #[test]
    fn test_reference_figures() {
        assert_eq!(number_to_words(1062), "One Thousand Sixty Two");
        assert_eq!(number_to_words(100_000), "One Lakh");
    }

    #[test]
    fn test_lakh_crore_grouping() {
        assert_eq!(number_to_words(2_50_000), "Two Lakh Fifty Thousand");
        assert_eq!(number_to_words(1_00_00_000), "One Crore");
        assert_eq!(
            number_to_words(1_23_45_678),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight"
        );
    }

    #[test]
    fn test_amount_in_words_rounds_and_suffixes() {
        assert_eq!(
            amount_in_words(Money::from_paise(106_200)),
            "One Thousand Sixty Two Rupees Only"
        );
        // ₹10.50 rounds up to ₹11
        assert_eq!(amount_in_words(Money::from_paise(1050)), "Eleven Rupees Only");
    }
}
