use serde_json::{json, Value};

use crate::model::PredictionOutcome;

/// JSON output schema for the summary operation.
pub fn summary_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A concise, insightful summary of the fraud detection results, written for a financial analyst. About 2-3 sentences long."
            }
        },
        "required": ["summary"],
        "additionalProperties": false
    })
}

/// JSON output schema for the question-answering operation.
pub fn answer_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "answer": {
                "type": "string",
                "description": "A concise and helpful answer to the user's question."
            }
        },
        "required": ["answer"],
        "additionalProperties": false
    })
}

fn schema_text(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_else(|_| "{}".to_string())
}

/// Build the result-summary prompt.
///
/// Each outcome contributes only its id, label, and risk score — feature
/// values are deliberately excluded from this prompt.
pub fn build_summary_prompt(outcomes: &[PredictionOutcome]) -> String {
    let schema = schema_text(&summary_output_schema());
    let data: String = outcomes
        .iter()
        .map(|o| {
            format!(
                "- Transaction {}: Prediction: {}, Risk Score: {}\n",
                o.id, o.prediction, o.risk_score
            )
        })
        .collect();

    format!(
        r#"You are a senior financial analyst providing a summary of fraud detection results.

Analyze the following transaction prediction data and generate a concise, insightful summary of 2-3 sentences.

Your summary should include:
- The total number of transactions analyzed.
- The number of transactions flagged as "Fraudulent".
- The overall fraud rate as a percentage.
- A brief concluding remark on the overall risk level.

Do not list individual transactions. Provide a high-level overview.

Return a JSON object matching this schema:
{schema}

Transaction Data:
{data}"#
    )
}

/// Build the question-answering prompt: the verbatim question plus the full
/// outcome list as JSON, including feature values.
pub fn build_answer_prompt(question: &str, outcomes: &[PredictionOutcome]) -> String {
    let schema = schema_text(&answer_output_schema());
    let data = serde_json::to_string_pretty(outcomes).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are a helpful financial analyst assistant. Your task is to answer questions about a given set of credit card transaction fraud predictions.

The user will provide a question and the transaction data. Base your answer ONLY on the data provided.
If the question cannot be answered from the data, say so. Keep your answers concise and to the point.

Return a JSON object matching this schema:
{schema}

User Question:
"{question}"

Transaction Data:
```json
{data}
```
"#
    )
}
