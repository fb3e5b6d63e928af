//! Formatting for the presentation layer: amounts with thousands separators,
//! two-decimal percentages and "times"-suffixed ratios.

use crate::liquidity::{LiquidityAssessment, LiquidityIndicator};
use crate::schema::AnalyzedTable;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};

const TABLE_HEADERS: [&str; 6] = [
    "Line item",
    "Prior year",
    "Current year",
    "Growth (%)",
    "Prior share (%)",
    "Current share (%)",
];

/// Rounds to a whole number and groups digits in threes: `1234567.6` -> `1,234,568`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn format_times(indicator: &LiquidityIndicator) -> String {
    match indicator {
        LiquidityIndicator::Ratio(value) => format!("{:.2} times", value),
        other => other.to_string(),
    }
}

/// Metric delta between the two periods, absent unless both are plain ratios.
pub fn format_delta(liquidity: &LiquidityAssessment) -> Option<String> {
    liquidity.difference().map(|delta| format!("{:.2}", delta))
}

/// Renders the analyzed table for a terminal, with amounts and percentages
/// right-aligned.
pub fn render_table(table: &AnalyzedTable) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(TABLE_HEADERS.iter().map(|h| Cell::new(h).set_alignment(CellAlignment::Center)));

    for row in &table.rows {
        out.add_row(vec![
            Cell::new(&row.item.label),
            Cell::new(format_amount(row.item.prior_value)).set_alignment(CellAlignment::Right),
            Cell::new(format_amount(row.item.current_value)).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(row.growth_pct)).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(row.prior_share_pct)).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(row.current_share_pct)).set_alignment(CellAlignment::Right),
        ]);
    }

    out.to_string()
}
