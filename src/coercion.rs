//! Lenient conversion of raw spreadsheet cells into numbers.
//!
//! Anything that cannot be read as a finite number becomes `0.0`. This is an
//! ingestion policy, not validation: malformed cells never raise.

use crate::schema::{FinancialTable, LineItem, RawCell, RawRow};

pub fn coerce_numeric(cell: &RawCell) -> f64 {
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        RawCell::Bool(true) => 1.0,
        RawCell::Bool(false) | RawCell::Empty => 0.0,
    };

    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn coerce_label(cell: &RawCell) -> String {
    match cell {
        RawCell::Text(s) => s.clone(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Bool(b) => b.to_string(),
        RawCell::Empty => String::new(),
    }
}

pub fn coerce_row(row: &RawRow) -> LineItem {
    LineItem {
        label: coerce_label(&row.label),
        prior_value: coerce_numeric(&row.prior),
        current_value: coerce_numeric(&row.current),
    }
}

/// Coerces every row, preserving source order.
pub fn coerce_rows(rows: &[RawRow]) -> FinancialTable {
    FinancialTable::new(rows.iter().map(coerce_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce_numeric(&RawCell::Number(1234.5)), 1234.5);
        assert_eq!(coerce_numeric(&RawCell::Number(-20.0)), -20.0);
    }

    #[test]
    fn test_numeric_text_is_parsed() {
        assert_eq!(coerce_numeric(&RawCell::text("  4500 ")), 4500.0);
        assert_eq!(coerce_numeric(&RawCell::text("-12.25")), -12.25);
        assert_eq!(coerce_numeric(&RawCell::text("1e3")), 1000.0);
    }

    #[test]
    fn test_malformed_text_becomes_zero() {
        assert_eq!(coerce_numeric(&RawCell::text("n/a")), 0.0);
        assert_eq!(coerce_numeric(&RawCell::text("1,000")), 0.0);
        assert_eq!(coerce_numeric(&RawCell::text("")), 0.0);
        assert_eq!(coerce_numeric(&RawCell::Empty), 0.0);
    }

    #[test]
    fn test_non_finite_values_become_zero() {
        assert_eq!(coerce_numeric(&RawCell::text("inf")), 0.0);
        assert_eq!(coerce_numeric(&RawCell::text("NaN")), 0.0);
        assert_eq!(coerce_numeric(&RawCell::Number(f64::NAN)), 0.0);
        assert_eq!(coerce_numeric(&RawCell::Number(f64::NEG_INFINITY)), 0.0);
    }

    #[test]
    fn test_booleans_coerce_to_one_or_zero() {
        assert_eq!(coerce_numeric(&RawCell::Bool(true)), 1.0);
        assert_eq!(coerce_numeric(&RawCell::Bool(false)), 0.0);
    }

    #[test]
    fn test_coerce_rows_keeps_order_and_labels() {
        let rows = vec![
            RawRow::new("TOTAL ASSETS", 1000.0, "1200"),
            RawRow::new(RawCell::Number(2024.0), "abc", RawCell::Empty),
        ];

        let table = coerce_rows(&rows);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], LineItem::new("TOTAL ASSETS", 1000.0, 1200.0));
        assert_eq!(table.rows[1], LineItem::new("2024", 0.0, 0.0));
    }
}
