use serde_json::Value;
use tracing::error;

use crate::error::FraudLensError;

/// Capability seam for the hosted text-generation service.
///
/// One call sends a prompt with a declared JSON output schema and returns
/// the provider's raw text response. The pipeline depends only on this
/// contract; tests substitute counting/canned implementations.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String, FraudLensError>;
}

/// Truncate text for log/error output without splitting a UTF-8 character.
/// Provider responses are arbitrary text, so a byte index may land inside a
/// multibyte sequence.
pub(crate) fn truncate_for_log(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Strip markdown code fences from a provider response if present.
/// Providers without strict JSON mode sometimes wrap JSON in ```json ... ```.
pub(crate) fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let after_open = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    };
    let cleaned = after_open.trim_end();
    if let Some(stripped) = cleaned.strip_suffix("```") {
        stripped.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

/// Parse a structured response and extract the single expected string field
/// (`summary` or `answer`). Anything else is a generation failure.
pub(crate) fn parse_string_field(response: &str, field: &str) -> Result<String, FraudLensError> {
    let cleaned = strip_markdown_json(response);
    let json: Value = serde_json::from_str(&cleaned).map_err(|e| {
        let truncated = truncate_for_log(&cleaned, 500);
        let msg = format!(
            "Response is not valid JSON: {}. Raw response (first 500 chars): {}",
            e, truncated
        );
        error!("{}", msg);
        FraudLensError::Generation(msg)
    })?;

    match json[field].as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => {
            let msg = format!("Response is missing a non-empty '{}' field", field);
            error!("{}", msg);
            Err(FraudLensError::Generation(msg))
        }
    }
}
