//! # Financial Statement Analyst
//!
//! Two-period analysis of a balance sheet exported to a spreadsheet, with an
//! AI layer for written commentary and follow-up questions.
//!
//! ## Core Concepts
//!
//! - **Line items**: rows of `label | prior year | current year`; unparseable
//!   amounts are read as zero
//! - **Derived columns**: growth (%) and share of total assets (%) for both years
//! - **Anchor rows**: rows found by case-insensitive label substring, e.g.
//!   "TOTAL ASSETS". A missing total-assets row aborts the analysis; missing
//!   short-term rows only degrade the liquidity indicators to N/A
//! - **Current ratio**: short-term assets / short-term liabilities per year,
//!   "indeterminate" when liabilities are zero
//! - **Context**: a Markdown summary regenerated on every AI call
//! - **Chat session**: an append-only log; only the last five turns travel with
//!   each question
//!
//! ## Example
//!
//! ```rust
//! use financial_statement_analyst::*;
//!
//! let rows = vec![
//!     RawRow::new("TOTAL ASSETS", 1000.0, 1200.0),
//!     RawRow::new("SHORT-TERM ASSETS", 400.0, 600.0),
//!     RawRow::new("SHORT-TERM LIABILITIES", 200.0, 0.0),
//! ];
//!
//! let table = coerce_rows(&rows);
//! let snapshot = process_financial_table(&table, &AnchorLabels::default()).unwrap();
//!
//! assert_eq!(snapshot.liquidity.prior, LiquidityIndicator::Ratio(2.0));
//! assert_eq!(snapshot.liquidity.current, LiquidityIndicator::Indeterminate);
//! ```

pub mod app;
pub mod backend;
pub mod coercion;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod ingestion;
pub mod liquidity;
pub mod llm;
pub mod locator;
pub mod ratios;
pub mod schema;
pub mod secrets;
pub mod session;

pub use app::AnalystApp;
pub use backend::{BackendProvider, TextGenerator};
pub use coercion::{coerce_label, coerce_numeric, coerce_rows};
pub use config::{AnalystConfig, AnchorLabels, HttpSettings};
pub use context::{assemble_context, AnalysisContext};
pub use error::{AnalysisError, Result};
pub use ingestion::{load_table, read_workbook, read_workbook_bytes};
pub use liquidity::{current_ratio, LiquidityAssessment, LiquidityIndicator};
pub use llm::commentary::{request_commentary, Commentary};
pub use locator::{find_all, find_row, Labelled};
pub use ratios::{RatioCache, RatioEngine, EPSILON};
pub use schema::*;
pub use secrets::{EnvSecretStore, SecretStore, StaticSecretStore};
pub use session::{ChatSession, SessionState, HISTORY_WINDOW};

use locator::ambiguous_matches;
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything derived from one loaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSnapshot {
    pub table: AnalyzedTable,
    pub liquidity: LiquidityAssessment,
    /// Recoverable conditions: ambiguous anchors, missing short-term rows and
    /// zero denominators.
    #[serde(default)]
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisSnapshot {
    pub fn process(table: &FinancialTable, anchors: &AnchorLabels) -> Result<Self> {
        let analyzed = RatioEngine::new(&anchors.total_assets).process(table)?;
        Ok(Self::finish(table, analyzed, anchors))
    }

    pub fn process_cached(
        table: &FinancialTable,
        anchors: &AnchorLabels,
        cache: &mut RatioCache,
    ) -> Result<Self> {
        let engine = RatioEngine::new(&anchors.total_assets);
        let analyzed = cache.process(&engine, table)?;
        Ok(Self::finish(table, analyzed, anchors))
    }

    fn finish(table: &FinancialTable, analyzed: AnalyzedTable, anchors: &AnchorLabels) -> Self {
        info!("Analyzing {} line items", table.len());

        let mut warnings = Vec::new();
        for label in [
            &anchors.total_assets,
            &anchors.short_term_assets,
            &anchors.short_term_liabilities,
        ] {
            if let Some(matches) = ambiguous_matches(&table.rows, label) {
                warn!(
                    "{} rows match '{}'; using '{}'",
                    matches.len(),
                    label,
                    matches[0]
                );
                warnings.push(AnalysisWarning::AmbiguousAnchor {
                    label: label.clone(),
                    matches,
                });
            }
        }

        let liquidity = current_ratio(&analyzed, anchors);
        warnings.extend(liquidity.warnings.iter().cloned());
        debug!(
            "Current ratio: prior {}, current {}",
            liquidity.prior, liquidity.current
        );

        Self {
            table: analyzed,
            liquidity,
            warnings,
        }
    }

    /// Builds a fresh AI context for this snapshot.
    pub fn context(&self, anchors: &AnchorLabels) -> AnalysisContext {
        assemble_context(&self.table, &self.liquidity, anchors)
    }
}

pub fn process_financial_table(
    table: &FinancialTable,
    anchors: &AnchorLabels,
) -> Result<AnalysisSnapshot> {
    AnalysisSnapshot::process(table, anchors)
}
