//! Line item lookup by case-insensitive substring match on the label.
//!
//! Matching is deliberately loose: "SHORT-TERM ASSETS" also matches
//! "TOTAL SHORT-TERM ASSETS". The first row in table order wins; callers that
//! care can use [`find_all`] to detect when more than one row qualifies.

use crate::schema::{AnalyzedRow, LineItem};

pub trait Labelled {
    fn label(&self) -> &str;
}

impl Labelled for LineItem {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labelled for AnalyzedRow {
    fn label(&self) -> &str {
        &self.item.label
    }
}

fn label_matches(label: &str, needle_lower: &str) -> bool {
    label.to_lowercase().contains(needle_lower)
}

/// First row whose label contains `needle`, ignoring case.
pub fn find_row<'a, T: Labelled>(rows: &'a [T], needle: &str) -> Option<&'a T> {
    let needle = needle.to_lowercase();
    rows.iter().find(|row| label_matches(row.label(), &needle))
}

/// Every row whose label contains `needle`, in table order.
pub fn find_all<'a, T: Labelled>(rows: &'a [T], needle: &str) -> Vec<&'a T> {
    let needle = needle.to_lowercase();
    rows.iter()
        .filter(|row| label_matches(row.label(), &needle))
        .collect()
}

/// Labels of all matching rows when the lookup is ambiguous, `None` otherwise.
pub fn ambiguous_matches<T: Labelled>(rows: &[T], needle: &str) -> Option<Vec<String>> {
    let matches = find_all(rows, needle);
    if matches.len() > 1 {
        Some(matches.iter().map(|row| row.label().to_string()).collect())
    } else {
        None
    }
}
