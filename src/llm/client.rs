use crate::backend::{BackendProvider, TextGenerator};
use crate::config::{AnalystConfig, HttpSettings};
use crate::error::{AnalysisError, Result};
use crate::llm::types::*;
use crate::schema::ChatTurn;
use crate::secrets::SecretStore;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_settings(api_key, &HttpSettings::default())
    }

    pub fn with_settings(api_key: String, settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_retries: settings.max_retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        })
    }

    pub(crate) async fn generate_content(
        &self,
        model: &str,
        payload: &GenerateContentRequest,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let mut backoff = self.retry_backoff;
        let mut attempt = 0;

        loop {
            debug!(
                "Gemini request to {} ({} contents, attempt {})",
                model,
                payload.contents.len(),
                attempt + 1
            );

            match self.client.post(&url).json(payload).send().await {
                Ok(res) => {
                    let status = res.status();

                    if status.is_success() {
                        let body: GenerateContentResponse = res.json().await?;
                        return extract_text(body);
                    }

                    let retryable =
                        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

                    if retryable && attempt < self.max_retries {
                        let wait = if status == StatusCode::TOO_MANY_REQUESTS {
                            res.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .map(Duration::from_secs)
                                .unwrap_or(backoff)
                        } else {
                            backoff
                        };

                        warn!(
                            "Gemini returned {}; retry {}/{} in {:?}",
                            status,
                            attempt + 1,
                            self.max_retries,
                            wait
                        );
                        sleep(wait).await;
                        backoff *= 2;
                        attempt += 1;
                        continue;
                    }

                    let err_text = res.text().await.unwrap_or_default();
                    return Err(AnalysisError::Transport(format!(
                        "Gemini API Error (status {}) after {} attempt(s): {}",
                        status,
                        attempt + 1,
                        err_text
                    )));
                }
                Err(e) if attempt < self.max_retries => {
                    warn!(
                        "Gemini request failed ({}); retry {}/{} in {:?}",
                        e,
                        attempt + 1,
                        self.max_retries,
                        backoff
                    );
                    sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn extract_text(body: GenerateContentResponse) -> Result<String> {
    let candidate = match body.candidates.and_then(|c| c.into_iter().next()) {
        Some(candidate) => candidate,
        None => {
            let reason = body
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked ({})", r))
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(AnalysisError::Transport(reason));
        }
    };

    let text = candidate.content.map(|c| c.text()).unwrap_or_default();
    if text.is_empty() {
        return Err(AnalysisError::Transport(format!(
            "model returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let payload = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
        };
        self.generate_content(model, &payload).await
    }

    async fn generate_chat(
        &self,
        model: &str,
        prior_turns: &[ChatTurn],
        system_instruction: &str,
        new_turn: &ChatTurn,
    ) -> Result<String> {
        let contents = prior_turns
            .iter()
            .chain(std::iter::once(new_turn))
            .map(Content::from)
            .collect();

        let payload = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(system_instruction)),
        };
        self.generate_content(model, &payload).await
    }
}

/// Builds a [`GeminiClient`] per call, reading the API key from a secret store.
pub struct GeminiProvider<S> {
    secrets: S,
    api_key_name: String,
    settings: HttpSettings,
}

impl<S: SecretStore> GeminiProvider<S> {
    pub fn new(secrets: S, config: &AnalystConfig) -> Self {
        Self {
            secrets,
            api_key_name: config.api_key_name.clone(),
            settings: config.http.clone(),
        }
    }
}

impl<S: SecretStore> BackendProvider for GeminiProvider<S> {
    type Generator = GeminiClient;

    fn connect(&self) -> Result<GeminiClient> {
        let api_key = self.secrets.require(&self.api_key_name)?;
        GeminiClient::with_settings(api_key, &self.settings)
    }
}
