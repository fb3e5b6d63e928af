use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An uncoerced spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

/// One spreadsheet row as read, before numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub label: RawCell,
    pub prior: RawCell,
    pub current: RawCell,
}

impl RawRow {
    pub fn new(
        label: impl Into<RawCell>,
        prior: impl Into<RawCell>,
        current: impl Into<RawCell>,
    ) -> Self {
        Self {
            label: label.into(),
            prior: prior.into(),
            current: current.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(
            (&self.label, &self.prior, &self.current),
            (RawCell::Empty, RawCell::Empty, RawCell::Empty)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    #[schemars(description = "Line item label exactly as it appears in the source sheet")]
    pub label: String,

    #[schemars(description = "Prior-year value after numeric coercion (unparseable cells are 0)")]
    pub prior_value: f64,

    #[schemars(description = "Current-year value after numeric coercion (unparseable cells are 0)")]
    pub current_value: f64,
}

impl LineItem {
    pub fn new(label: impl Into<String>, prior_value: f64, current_value: f64) -> Self {
        Self {
            label: label.into(),
            prior_value,
            current_value,
        }
    }
}

/// Coerced line items in source row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTable {
    pub rows: Vec<LineItem>,
}

impl FinancialTable {
    pub fn new(rows: Vec<LineItem>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzedRow {
    #[serde(flatten)]
    pub item: LineItem,

    #[schemars(description = "(current - prior) / prior * 100, with a zero prior replaced by 1e-9")]
    pub growth_pct: f64,

    #[schemars(description = "Prior value as a percentage of prior-year total assets")]
    pub prior_share_pct: f64,

    #[schemars(description = "Current value as a percentage of current-year total assets")]
    pub current_share_pct: f64,
}

/// A financial table with every derived column populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzedTable {
    pub rows: Vec<AnalyzedRow>,
}

impl AnalyzedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Prior,
    Current,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Prior => write!(f, "prior year"),
            Period::Current => write!(f, "current year"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Recoverable conditions noticed while analysing a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    #[schemars(description = "A secondary anchor row was not found; dependent indicators are N/A")]
    MissingAnchor { label: String },

    #[schemars(description = "A denominator was zero; the indicator for that period is indeterminate")]
    ZeroDenominator { period: Period },

    #[schemars(description = "Several rows matched an anchor label; the first one was used")]
    AmbiguousAnchor { label: String, matches: Vec<String> },
}

impl std::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisWarning::MissingAnchor { label } => write!(
                f,
                "Line item '{}' not found; liquidity indicators are shown as N/A",
                label
            ),
            AnalysisWarning::ZeroDenominator { period } => write!(
                f,
                "Short-term liabilities are zero for the {}; the current ratio is indeterminate",
                period
            ),
            AnalysisWarning::AmbiguousAnchor { label, matches } => write!(
                f,
                "{} rows match '{}' ({}); using the first",
                matches.len(),
                label,
                matches.join(", ")
            ),
        }
    }
}
