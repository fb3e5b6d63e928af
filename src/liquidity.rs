use crate::config::AnchorLabels;
use crate::locator::find_row;
use crate::schema::{AnalysisWarning, AnalyzedTable, Period};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current ratio for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LiquidityIndicator {
    #[schemars(description = "Short-term assets divided by short-term liabilities")]
    Ratio(f64),

    #[schemars(description = "An anchor row is missing; rendered as N/A")]
    Unavailable,

    #[schemars(description = "Short-term liabilities are zero")]
    Indeterminate,
}

impl LiquidityIndicator {
    pub fn value(&self) -> Option<f64> {
        match self {
            LiquidityIndicator::Ratio(value) => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for LiquidityIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiquidityIndicator::Ratio(value) => write!(f, "{:.2}", value),
            LiquidityIndicator::Unavailable => write!(f, "N/A"),
            LiquidityIndicator::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LiquidityAssessment {
    pub prior: LiquidityIndicator,
    pub current: LiquidityIndicator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AnalysisWarning>,
}

impl LiquidityAssessment {
    pub fn unavailable(warnings: Vec<AnalysisWarning>) -> Self {
        Self {
            prior: LiquidityIndicator::Unavailable,
            current: LiquidityIndicator::Unavailable,
            warnings,
        }
    }

    /// Current minus prior, when both periods have a plain ratio.
    pub fn difference(&self) -> Option<f64> {
        Some(self.current.value()? - self.prior.value()?)
    }
}

fn period_ratio(
    period: Period,
    assets: f64,
    liabilities: f64,
    warnings: &mut Vec<AnalysisWarning>,
) -> LiquidityIndicator {
    if liabilities == 0.0 {
        warn!("Short-term liabilities are zero for the {}", period);
        warnings.push(AnalysisWarning::ZeroDenominator { period });
        LiquidityIndicator::Indeterminate
    } else {
        LiquidityIndicator::Ratio(assets / liabilities)
    }
}

/// Current ratio (short-term assets / short-term liabilities) for both periods.
///
/// Missing rows and zero liabilities degrade to sentinel indicators with a
/// warning; this never fails.
pub fn current_ratio(table: &AnalyzedTable, anchors: &AnchorLabels) -> LiquidityAssessment {
    let assets = find_row(&table.rows, &anchors.short_term_assets);
    let liabilities = find_row(&table.rows, &anchors.short_term_liabilities);

    let (assets, liabilities) = match (assets, liabilities) {
        (Some(assets), Some(liabilities)) => (&assets.item, &liabilities.item),
        (assets, liabilities) => {
            let mut warnings = Vec::new();
            if assets.is_none() {
                warn!("Line item '{}' not found", anchors.short_term_assets);
                warnings.push(AnalysisWarning::MissingAnchor {
                    label: anchors.short_term_assets.clone(),
                });
            }
            if liabilities.is_none() {
                warn!("Line item '{}' not found", anchors.short_term_liabilities);
                warnings.push(AnalysisWarning::MissingAnchor {
                    label: anchors.short_term_liabilities.clone(),
                });
            }
            return LiquidityAssessment::unavailable(warnings);
        }
    };

    let mut warnings = Vec::new();
    let prior = period_ratio(
        Period::Prior,
        assets.prior_value,
        liabilities.prior_value,
        &mut warnings,
    );
    let current = period_ratio(
        Period::Current,
        assets.current_value,
        liabilities.current_value,
        &mut warnings,
    );

    LiquidityAssessment {
        prior,
        current,
        warnings,
    }
}
