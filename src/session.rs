use crate::backend::TextGenerator;
use crate::context::AnalysisContext;
use crate::llm::prompts::{build_chat_system_instruction, chat_failure_message};
use crate::schema::ChatTurn;
use log::{debug, warn};

/// Number of stored turns sent along with each new question.
pub const HISTORY_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Active,
}

/// The chat log for one loaded table.
///
/// The log is append-only; only [`ChatSession::reset`] (called when a new file
/// is loaded) clears it. Failed exchanges stay in the log as assistant turns.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.turns.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Active
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn reset(&mut self) {
        if !self.turns.is_empty() {
            debug!("Clearing {} chat turns", self.turns.len());
        }
        self.turns.clear();
    }

    /// The most recent turns that accompany the next request.
    pub fn history_window(&self) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(HISTORY_WINDOW);
        &self.turns[start..]
    }

    /// Sends a question and records both sides of the exchange.
    ///
    /// The user turn is logged before the request goes out. A backend failure is
    /// turned into a diagnostic assistant turn and returned like any other reply.
    pub async fn ask<G: TextGenerator + ?Sized>(
        &mut self,
        generator: &G,
        model: &str,
        context: &AnalysisContext,
        user_text: &str,
    ) -> String {
        let history = self.history_window().to_vec();
        let user_turn = ChatTurn::user(user_text);
        self.turns.push(user_turn.clone());

        let system_instruction = build_chat_system_instruction(context);
        debug!(
            "Sending chat request with {} prior turns",
            history.len()
        );

        let reply = match generator
            .generate_chat(model, &history, &system_instruction, &user_turn)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Chat request failed: {}", e);
                chat_failure_message(&e)
            }
        };

        self.turns.push(ChatTurn::assistant(reply.clone()));
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::table_row;
    use crate::error::{AnalysisError, Result};
    use crate::schema::ChatRole;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGenerator {
        fail: bool,
        requests: Mutex<Vec<(Vec<ChatTurn>, String, ChatTurn)>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
            unreachable!("chat sessions only use generate_chat")
        }

        async fn generate_chat(
            &self,
            _model: &str,
            prior_turns: &[ChatTurn],
            system_instruction: &str,
            new_turn: &ChatTurn,
        ) -> Result<String> {
            let mut requests = self.requests.lock().unwrap();
            requests.push((
                prior_turns.to_vec(),
                system_instruction.to_string(),
                new_turn.clone(),
            ));
            if self.fail {
                return Err(AnalysisError::Transport("quota exceeded".to_string()));
            }
            Ok(format!("answer {}", requests.len()))
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
                100.0,
                150.0,
            )]))
            .unwrap();
        let anchors = AnchorLabels::default();
        let liquidity = current_ratio(&table, &anchors);
        assemble_context(&table, &liquidity, &anchors)
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_both_turns() {
        let generator = RecordingGenerator::default();
        let mut session = ChatSession::new();
        assert_eq!(session.state(), SessionState::Empty);

        let reply = session
            .ask(&generator, "model", &context(), "How did assets grow?")
            .await;

        assert_eq!(reply, "answer 1");
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(
            session.turns(),
            &[
                ChatTurn::user("How did assets grow?"),
                ChatTurn::assistant("answer 1")
            ]
        );

        let requests = generator.requests.lock().unwrap();
        let (history, system, new_turn) = &requests[0];
        assert!(history.is_empty());
        let total = table_row(system, "TOTAL ASSETS").unwrap();
        assert_eq!(&total[1..4], &["100", "150", "50.00"]);
        assert_eq!(new_turn, &ChatTurn::user("How did assets grow?"));
    }

    #[tokio::test]
    async fn test_eighth_request_carries_five_prior_turns() {
        let generator = RecordingGenerator::default();
        let mut session = ChatSession::new();
        let context = context();

        for i in 1..=7 {
            session
                .ask(&generator, "model", &context, &format!("question {}", i))
                .await;
        }
        session.ask(&generator, "model", &context, "question 8").await;

        let requests = generator.requests.lock().unwrap();
        let (history, _, new_turn) = &requests[7];
        assert_eq!(history.len(), HISTORY_WINDOW);
        assert_eq!(history.len() + 1, 6);
        assert_eq!(history[0], ChatTurn::assistant("answer 5"));
        assert_eq!(history[1], ChatTurn::user("question 6"));
        assert_eq!(history[4], ChatTurn::assistant("answer 7"));
        assert_eq!(new_turn, &ChatTurn::user("question 8"));

        assert_eq!(session.turns().len(), 16);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_assistant_turn() {
        let generator = RecordingGenerator {
            fail: true,
            ..Default::default()
        };
        let mut session = ChatSession::new();

        let reply = session
            .ask(&generator, "model", &context(), "Is liquidity healthy?")
            .await;

        assert!(reply.contains("quota exceeded"));
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[0].role, ChatRole::User);
        assert_eq!(session.turns()[1].role, ChatRole::Assistant);
        assert_eq!(session.turns()[1].content, reply);
    }

    #[tokio::test]
    async fn test_reset_empties_the_log() {
        let generator = RecordingGenerator::default();
        let mut session = ChatSession::new();
        session.ask(&generator, "model", &context(), "hello").await;

        session.reset();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.history_window().is_empty());
    }
}
