pub mod generation;
pub mod prompts;
pub mod providers;

use tracing::info;

pub use generation::TextGenerator;
pub use providers::{LlmClient, Provider};

use crate::error::FraudLensError;
use crate::model::PredictionOutcome;

/// Fixed summary shown when no outcomes exist. Returned without any
/// external call.
pub const EMPTY_RUN_SUMMARY: &str =
    "No transactions were processed. Please run a prediction to see a summary.";

/// Degraded fallback shown by callers when summary generation fails.
/// Raw failures are never surfaced to the end user.
pub const SUMMARY_FALLBACK: &str = "Could not generate a summary.";

/// Fixed chat reply when a question arrives before any prediction run.
pub const NO_DATA_REPLY: &str =
    "I can't answer questions until some transaction data is available. Please run a prediction first.";

/// Generate the 2-3 sentence analyst summary for a prediction run.
///
/// An empty outcome list short-circuits with [`EMPTY_RUN_SUMMARY`] and must
/// not invoke the external capability — that request would be meaningless.
pub async fn summarize<G: TextGenerator>(
    generator: &G,
    outcomes: &[PredictionOutcome],
) -> Result<String, FraudLensError> {
    if outcomes.is_empty() {
        return Ok(EMPTY_RUN_SUMMARY.to_string());
    }

    info!("Requesting summary for {} outcomes", outcomes.len());
    let prompt = prompts::build_summary_prompt(outcomes);
    let schema = prompts::summary_output_schema();
    let response = generator.generate(&prompt, &schema).await?;
    generation::parse_string_field(&response, "summary")
}

/// Answer a free-form question about the current prediction run.
///
/// Preconditions checked before any external call: outcomes non-empty
/// ("no data available") and question non-empty ("no question provided").
pub async fn answer<G: TextGenerator>(
    generator: &G,
    question: &str,
    outcomes: &[PredictionOutcome],
) -> Result<String, FraudLensError> {
    if outcomes.is_empty() {
        return Err(FraudLensError::Validation("no data available".to_string()));
    }
    if question.trim().is_empty() {
        return Err(FraudLensError::Validation(
            "no question provided".to_string(),
        ));
    }

    info!(
        "Answering question over {} outcomes: {}",
        outcomes.len(),
        question.trim()
    );
    // The prompt gets the question exactly as the user typed it.
    let prompt = prompts::build_answer_prompt(question, outcomes);
    let schema = prompts::answer_output_schema();
    let response = generator.generate(&prompt, &schema).await?;
    generation::parse_string_field(&response, "answer")
}
