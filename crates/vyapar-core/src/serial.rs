//! # Serial-Number Plumbing
//!
//! Parsing, generation, and duplicate detection for serial-number batches.
//!
//! ## Serial Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Auto-generated (serialized receipt)                                    │
//! │     SN{millis%1e6}{random}-{n}      e.g. SN83729142-1, SN83729142-2    │
//! │     prefix + time component + random component + per-batch suffix      │
//! │                                                                         │
//! │  Bulk placeholder (unserialized receipt)                                │
//! │     BULK-{millis}-{random}-{n}      e.g. BULK-1718000123456-517-0      │
//! │     keeps the "stock = set cardinality" invariant for items whose      │
//! │     units carry no meaningful serial; never shown as a real serial     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Regeneration is idempotent in intent: re-running with the same quantity
//! produces a fresh, still-unique batch (new clock + random components),
//! never a repeat of an earlier batch.

use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;

/// Prefix for auto-generated serials.
pub const SERIAL_PREFIX: &str = "SN";

/// Reserved prefix marking bulk placeholders.
pub const BULK_PREFIX: &str = "BULK-";

// =============================================================================
// Parsing
// =============================================================================

/// Splits operator input (scanned or typed) into a clean serial batch.
/// Serials are separated by newlines and/or commas; blanks are dropped.
pub fn parse_serial_input(input: &str) -> Vec<String> {
    input
        .split(|c| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a serial is a synthesized bulk placeholder.
#[inline]
pub fn is_bulk_placeholder(serial: &str) -> bool {
    serial.starts_with(BULK_PREFIX)
}

// =============================================================================
// Generation
// =============================================================================

/// Generates a fresh batch of `quantity` serial numbers.
pub fn generate_serials(quantity: usize) -> Vec<String> {
    let millis = Utc::now().timestamp_millis();
    let random = rand::thread_rng().gen_range(0..100);
    generate_serials_at(millis, random, quantity)
}

/// Deterministic core of [`generate_serials`], split out for tests.
pub fn generate_serials_at(millis: i64, random: u32, quantity: usize) -> Vec<String> {
    let time_component = (millis % 1_000_000).abs();
    (0..quantity)
        .map(|i| format!("{SERIAL_PREFIX}{time_component:06}{random}-{}", i + 1))
        .collect()
}

/// Synthesizes `quantity` bulk placeholders for an unserialized receipt.
pub fn bulk_placeholders(quantity: usize) -> Vec<String> {
    let millis = Utc::now().timestamp_millis();
    let random = rand::thread_rng().gen_range(0..1000);
    (0..quantity)
        .map(|i| format!("{BULK_PREFIX}{millis}-{random}-{i}"))
        .collect()
}

// =============================================================================
// Duplicate Detection
// =============================================================================

/// Serials that appear more than once within `batch`, in first-seen order.
pub fn duplicates_within(batch: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for serial in batch {
        if !seen.insert(serial.as_str()) && !dupes.contains(serial) {
            dupes.push(serial.clone());
        }
    }
    dupes
}

/// Serials from `batch` that also occur in `existing`, in batch order.
pub fn overlap_with<'a, I>(batch: &[String], existing: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let existing: HashSet<&str> = existing.into_iter().collect();
    batch
        .iter()
        .filter(|s| existing.contains(s.as_str()))
        .cloned()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serial_input() {
        let batch = parse_serial_input("SN1, SN2\nSN3,\n  SN4  ");
        assert_eq!(batch, vec!["SN1", "SN2", "SN3", "SN4"]);
        assert!(parse_serial_input("  \n , ").is_empty());
    }

    #[test]
    fn test_generate_serials_format() {
        let batch = generate_serials_at(1_718_000_123_456, 42, 3);
        assert_eq!(batch, vec!["SN12345642-1", "SN12345642-2", "SN12345642-3"]);
        assert!(batch.iter().all(|s| s.starts_with(SERIAL_PREFIX)));
    }

    #[test]
    fn test_generate_serials_unique_within_batch() {
        let batch = generate_serials(50);
        assert_eq!(batch.len(), 50);
        assert!(duplicates_within(&batch).is_empty());
    }

    #[test]
    fn test_bulk_placeholders_marked_and_unique() {
        let batch = bulk_placeholders(10);
        assert_eq!(batch.len(), 10);
        assert!(batch.iter().all(|s| is_bulk_placeholder(s)));
        assert!(duplicates_within(&batch).is_empty());
        assert!(!is_bulk_placeholder("SN12345642-1"));
    }

    #[test]
    fn test_duplicates_within() {
        let batch: Vec<String> = ["A", "B", "A", "C", "B", "A"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(duplicates_within(&batch), vec!["A", "B"]);
    }

    #[test]
    fn test_overlap_with() {
        let batch: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let existing = ["B", "D"];
        assert_eq!(
            overlap_with(&batch, existing.iter().copied()),
            vec!["B".to_string()]
        );
    }
}
