use crate::error::Result;
use crate::schema::ChatTurn;
use async_trait::async_trait;

/// A text-completion service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One-shot completion of a single prompt.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Completion of `new_turn` given earlier turns and a system instruction.
    async fn generate_chat(
        &self,
        model: &str,
        prior_turns: &[ChatTurn],
        system_instruction: &str,
        new_turn: &ChatTurn,
    ) -> Result<String>;
}

/// Hands out a ready-to-use generator, resolving credentials at call time.
///
/// Returning [`crate::AnalysisError::MissingCredential`] here means no network
/// call is attempted.
pub trait BackendProvider {
    type Generator: TextGenerator;

    fn connect(&self) -> Result<Self::Generator>;
}
