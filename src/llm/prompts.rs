// Prompt templates for the commentary and chat requests

use crate::context::AnalysisContext;

pub const ANALYST_PERSONA: &str = "You are a professional financial analyst.";

pub fn build_analysis_prompt(context: &AnalysisContext) -> String {
    format!(
        r#"{persona} Based on the financial indicators below, write an objective, concise commentary (about 3-4 paragraphs) on the company's financial position. Focus the assessment on growth rates, changes in the asset structure and the current ratio.

Raw data and indicators:
{context}"#,
        persona = ANALYST_PERSONA,
        context = context
    )
}

pub fn build_chat_system_instruction(context: &AnalysisContext) -> String {
    format!(
        r#"{persona} Answer the user's questions using the following financial data as context:
---
{context}
---
Stay professional and keep answers short and focused on the data provided."#,
        persona = ANALYST_PERSONA,
        context = context
    )
}

pub fn commentary_failure_message(error: &dyn std::fmt::Display) -> String {
    format!(
        "AI analysis failed: check the API key or usage limits. Details: {}",
        error
    )
}

pub fn chat_failure_message(error: &dyn std::fmt::Display) -> String {
    format!(
        "AI chat request failed: check the API key or usage limits. Details: {}",
        error
    )
}
