//! Builds the text block that is the AI layer's only view of the analysis.
//!
//! The context is rebuilt from the current table on every call and never cached,
//! so a reloaded file can never leak stale numbers into a prompt.

use crate::config::AnchorLabels;
use crate::liquidity::LiquidityAssessment;
use crate::locator::find_row;
use crate::schema::AnalyzedTable;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, CellAlignment, Table};

/// Serialized summary of the current financial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisContext(String);

impl AnalysisContext {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Markdown cells must stay on one line and must not close the cell early.
fn markdown_cell(text: &str) -> Cell {
    Cell::new(
        text.replace(|c: char| c == '\r' || c == '\n', " ")
            .replace('|', "\\|"),
    )
}

/// First column is the row label; every other column is right-aligned.
fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_MARKDOWN)
        .set_header(headers.iter().map(|h| markdown_cell(h)));

    for row in rows {
        table.add_row(row.iter().enumerate().map(|(i, value)| {
            let cell = markdown_cell(value);
            if i == 0 {
                cell
            } else {
                cell.set_alignment(CellAlignment::Right)
            }
        }));
    }

    let mut out = table.to_string();
    out.push('\n');
    out
}

/// Trimmed cells of the Markdown row whose first cell is `first_cell`.
#[cfg(test)]
pub(crate) fn table_row<'a>(text: &'a str, first_cell: &str) -> Option<Vec<&'a str>> {
    text.lines().find_map(|line| {
        let inner = line.trim().strip_prefix('|')?.strip_suffix('|')?;
        let cells: Vec<&str> = inner.split(" | ").map(str::trim).collect();
        (cells.first() == Some(&first_cell)).then_some(cells)
    })
}

pub fn assemble_context(
    table: &AnalyzedTable,
    liquidity: &LiquidityAssessment,
    anchors: &AnchorLabels,
) -> AnalysisContext {
    let table_rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            vec![
                row.item.label.clone(),
                row.item.prior_value.to_string(),
                row.item.current_value.to_string(),
                format!("{:.2}", row.growth_pct),
                format!("{:.2}", row.prior_share_pct),
                format!("{:.2}", row.current_share_pct),
            ]
        })
        .collect();

    let short_term_growth = find_row(&table.rows, &anchors.short_term_assets)
        .map(|row| format!("{:.2}%", row.growth_pct))
        .unwrap_or_else(|| "N/A".to_string());

    let indicators = vec![
        vec![
            "Short-term assets growth (%)".to_string(),
            short_term_growth,
        ],
        vec![
            "Current ratio (prior year)".to_string(),
            liquidity.prior.to_string(),
        ],
        vec![
            "Current ratio (current year)".to_string(),
            liquidity.current.to_string(),
        ],
    ];

    let mut text = String::from("### Full analysis table\n\n");
    text.push_str(&markdown_table(
        &[
            "Line item",
            "Prior year",
            "Current year",
            "Growth (%)",
            "Prior share (%)",
            "Current share (%)",
        ],
        &table_rows,
    ));
    text.push_str("\n### Key indicators\n\n");
    text.push_str(&markdown_table(&["Indicator", "Value"], &indicators));

    AnalysisContext(text)
}
