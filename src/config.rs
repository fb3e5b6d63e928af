use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_NAME: &str = "GEMINI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Top-level settings, usually read from a TOML file.
///
/// Every field has a default so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystConfig {
    /// Model identifier passed to the AI backend.
    pub model: String,
    /// Name under which the API key is looked up in the secret store.
    pub api_key_name: String,
    pub anchors: AnchorLabels,
    pub http: HttpSettings,
    /// Number of distinct tables whose ratio computation is memoized.
    pub cache_capacity: usize,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_name: DEFAULT_API_KEY_NAME.to_string(),
            anchors: AnchorLabels::default(),
            http: HttpSettings::default(),
            cache_capacity: 8,
        }
    }
}

impl AnalystConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Label substrings used to locate the anchor rows of a balance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorLabels {
    pub total_assets: String,
    pub short_term_assets: String,
    pub short_term_liabilities: String,
}

impl Default for AnchorLabels {
    fn default() -> Self {
        Self {
            total_assets: "TOTAL ASSETS".to_string(),
            short_term_assets: "SHORT-TERM ASSETS".to_string(),
            short_term_liabilities: "SHORT-TERM LIABILITIES".to_string(),
        }
    }
}

impl AnchorLabels {
    /// Labels used by Vietnamese balance sheets (VAS layout).
    pub fn vietnamese() -> Self {
        Self {
            total_assets: "TỔNG CỘNG TÀI SẢN".to_string(),
            short_term_assets: "TÀI SẢN NGẮN HẠN".to_string(),
            short_term_liabilities: "NỢ NGẮN HẠN".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries after the first attempt for 429, 5xx and network failures.
    pub max_retries: u32,
    /// Initial backoff; doubles after each retry.
    pub retry_backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AnalystConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalystConfig::default());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.http.max_retries, 2);
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = AnalystConfig::from_toml_str(
            r#"
            model = "gemini-2.5-pro"

            [anchors]
            total_assets = "TỔNG CỘNG TÀI SẢN"

            [http]
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.anchors.total_assets, "TỔNG CỘNG TÀI SẢN");
        assert_eq!(config.anchors.short_term_assets, "SHORT-TERM ASSETS");
        assert_eq!(config.http.timeout_secs, 15);
        assert_eq!(config.http.retry_backoff_ms, 1000);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = AnalystConfig::from_toml_str("model = [1, 2]");
        assert!(result.is_err());
    }
}
