use crate::error::{AnalysisError, Result};
use std::collections::HashMap;

/// Source of credentials, consulted on every AI call.
pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn require(&self, name: &str) -> Result<String> {
        self.get(name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AnalysisError::MissingCredential(name.to_string()))
    }
}

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    values: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present_secret() {
        let store = StaticSecretStore::new().with("GEMINI_API_KEY", "abc");
        assert_eq!(store.require("GEMINI_API_KEY").unwrap(), "abc");
    }

    #[test]
    fn test_missing_or_blank_secret_is_credential_error() {
        let store = StaticSecretStore::new().with("BLANK", "   ");

        match store.require("GEMINI_API_KEY") {
            Err(AnalysisError::MissingCredential(name)) => assert_eq!(name, "GEMINI_API_KEY"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            store.require("BLANK"),
            Err(AnalysisError::MissingCredential(_))
        ));
    }
}
