use crate::error::{AnalysisError, Result};
use crate::locator::find_row;
use crate::schema::{AnalyzedRow, AnalyzedTable, FinancialTable, LineItem};
use log::debug;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;

/// Stand-in for a zero divisor. Growth from a zero base comes out as a very large
/// but finite percentage instead of infinity or NaN.
pub const EPSILON: f64 = 1e-9;

pub fn nonzero_or_epsilon(value: f64) -> f64 {
    if value == 0.0 {
        EPSILON
    } else {
        value
    }
}

/// `numerator / denominator` as a percentage, saturated to the finite range.
fn finite_pct(numerator: f64, denominator: f64) -> f64 {
    (numerator / nonzero_or_epsilon(denominator) * 100.0).clamp(-f64::MAX, f64::MAX)
}

pub fn growth_pct(item: &LineItem) -> f64 {
    finite_pct(item.current_value - item.prior_value, item.prior_value)
}

pub fn share_pct(value: f64, total: f64) -> f64 {
    finite_pct(value, total)
}

/// Computes growth and total-assets composition for every line item.
pub struct RatioEngine<'a> {
    total_assets_label: &'a str,
}

impl<'a> RatioEngine<'a> {
    pub fn new(total_assets_label: &'a str) -> Self {
        Self { total_assets_label }
    }

    /// Returns a new table; `table` itself is left untouched.
    ///
    /// Fails with [`AnalysisError::MissingAnchor`] when no row matches the
    /// total-assets label, in which case no derived columns exist at all.
    pub fn process(&self, table: &FinancialTable) -> Result<AnalyzedTable> {
        let total = find_row(&table.rows, self.total_assets_label)
            .ok_or_else(|| AnalysisError::MissingAnchor(self.total_assets_label.to_string()))?;

        let total_prior = total.prior_value;
        let total_current = total.current_value;
        debug!(
            "Total assets anchor '{}': prior {}, current {}",
            total.label, total_prior, total_current
        );

        let rows = table
            .rows
            .iter()
            .map(|item| AnalyzedRow {
                item: item.clone(),
                growth_pct: growth_pct(item),
                prior_share_pct: share_pct(item.prior_value, total_prior),
                current_share_pct: share_pct(item.current_value, total_current),
            })
            .collect();

        Ok(AnalyzedTable { rows })
    }
}

/// Memoizes [`RatioEngine::process`] by a content hash of its input.
///
/// A hit is indistinguishable from recomputation; failed passes are never stored.
pub struct RatioCache {
    entries: LruCache<[u8; 32], AnalyzedTable>,
}

impl RatioCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn content_key(total_assets_label: &str, table: &FinancialTable) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(total_assets_label.as_bytes());
        hasher.update([0u8]);
        for item in &table.rows {
            hasher.update((item.label.len() as u64).to_le_bytes());
            hasher.update(item.label.as_bytes());
            hasher.update(item.prior_value.to_bits().to_le_bytes());
            hasher.update(item.current_value.to_bits().to_le_bytes());
        }
        hasher.finalize().into()
    }

    pub fn process(&mut self, engine: &RatioEngine<'_>, table: &FinancialTable) -> Result<AnalyzedTable> {
        let key = Self::content_key(engine.total_assets_label, table);

        if let Some(hit) = self.entries.get(&key) {
            debug!("Ratio cache hit for {} rows", table.len());
            return Ok(hit.clone());
        }

        let analyzed = engine.process(table)?;
        self.entries.put(key, analyzed.clone());
        Ok(analyzed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RatioCache {
    fn default() -> Self {
        Self::new(8)
    }
}
