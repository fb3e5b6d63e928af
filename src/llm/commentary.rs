use crate::backend::TextGenerator;
use crate::context::AnalysisContext;
use crate::llm::prompts::{build_analysis_prompt, commentary_failure_message};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Narrative commentary, or the diagnostic shown in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    pub text: String,
    pub succeeded: bool,
}

/// Asks the model for a one-off written assessment of the analysis.
///
/// Transport failures do not propagate: they come back as a diagnostic
/// [`Commentary`] with `succeeded == false`.
pub async fn request_commentary<G: TextGenerator + ?Sized>(
    generator: &G,
    model: &str,
    context: &AnalysisContext,
) -> Commentary {
    let prompt = build_analysis_prompt(context);
    info!("Requesting AI commentary from {}", model);

    match generator.generate(model, &prompt).await {
        Ok(text) => Commentary {
            text,
            succeeded: true,
        },
        Err(e) => {
            warn!("Commentary request failed: {}", e);
            Commentary {
                text: commentary_failure_message(&e),
                succeeded: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::table_row;
    use crate::error::{AnalysisError, Result};
    use crate::schema::ChatTurn;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedGenerator {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| AnalysisError::Transport("HTTP 429 quota exhausted".to_string()))
        }

        async fn generate_chat(
            &self,
            _model: &str,
            _prior_turns: &[ChatTurn],
            _system_instruction: &str,
            _new_turn: &ChatTurn,
        ) -> Result<String> {
            unreachable!("commentary only uses generate")
        }
    }

    fn context() -> AnalysisContext {
        use crate::config::AnchorLabels;
        use crate::context::assemble_context;
        use crate::liquidity::current_ratio;
        use crate::ratios::RatioEngine;
        use crate::schema::{FinancialTable, LineItem};

        let table = RatioEngine::new("TOTAL ASSETS")
            .process(&FinancialTable::new(vec![LineItem::new(
                "TOTAL ASSETS",
                10.0,
                12.0,
            )]))
            .unwrap();
        let anchors = AnchorLabels::default();
        assemble_context(&table, &current_ratio(&table, &anchors), &anchors)
    }

    #[tokio::test]
    async fn test_commentary_embeds_context() {
        let generator = FixedGenerator {
            reply: Some("Assets grew steadily.".to_string()),
            prompts: Mutex::new(Vec::new()),
        };

        let commentary = request_commentary(&generator, "gemini-2.5-flash", &context()).await;
        assert!(commentary.succeeded);
        assert_eq!(commentary.text, "Assets grew steadily.");

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("You are a professional financial analyst."));
        let total = table_row(&prompts[0], "TOTAL ASSETS").unwrap();
        assert_eq!(&total[1..4], &["10", "12", "20.00"]);
    }

    #[tokio::test]
    async fn test_failure_becomes_diagnostic_text() {
        let generator = FixedGenerator {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        };

        let commentary = request_commentary(&generator, "gemini-2.5-flash", &context()).await;
        assert!(!commentary.succeeded);
        assert!(commentary.text.contains("HTTP 429 quota exhausted"));
    }
}
