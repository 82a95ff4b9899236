use std::time::Duration;

use serde_json::Value;
use tracing::error;

use super::generation::{truncate_for_log, TextGenerator};
use crate::error::FraudLensError;

/// Timeout for LLM API calls.
const REQUEST_TIMEOUT_SECS: u64 = 60;

const SYSTEM_PROMPT: &str = "You are a financial analysis assistant. Always respond with valid JSON only, no markdown formatting or code blocks.";

/// Supported hosted text-generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Claude,
    OpenAi,
    OpenRouter,
}

impl Provider {
    pub fn parse(name: &str) -> Result<Self, FraudLensError> {
        match name {
            "claude" => Ok(Provider::Claude),
            "openai" => Ok(Provider::OpenAi),
            "openrouter" => Ok(Provider::OpenRouter),
            _ => {
                let msg = format!(
                    "Unsupported AI provider: '{}'. Supported: claude, openai, openrouter",
                    name
                );
                error!("{}", msg);
                Err(FraudLensError::Generation(msg))
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
        }
    }
}

/// Client for a hosted text-generation capability.
///
/// The rest of the crate is oblivious to which provider is configured; it
/// only sees the [`TextGenerator`] contract. API key, provider, and model
/// are resolved by the caller and passed in at construction time.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: Provider,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(provider: &str, model: &str, api_key: &str) -> Result<Self, FraudLensError> {
        let provider = Provider::parse(provider)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                FraudLensError::Generation(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            provider,
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn post_json(
        &self,
        request: reqwest::RequestBuilder,
        body: &Value,
    ) -> Result<Value, FraudLensError> {
        let provider = self.provider.label();
        let response = request.json(body).send().await.map_err(|e| {
            let msg = if e.is_timeout() {
                format!(
                    "LLM API timeout after {}s for provider '{}'",
                    REQUEST_TIMEOUT_SECS, provider
                )
            } else {
                format!("LLM API request failed for {}: {}", provider, e)
            };
            error!("{}", msg);
            FraudLensError::Generation(msg)
        })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| {
            FraudLensError::Generation(format!(
                "Failed to read API response body from {}: {}",
                provider, e
            ))
        })?;

        if !status.is_success() {
            let truncated = truncate_for_log(&body_text, 1024);
            let msg = format!("LLM API error: {} from {} - {}", status, provider, truncated);
            error!("{}", msg);
            return Err(FraudLensError::Generation(msg));
        }

        serde_json::from_str(&body_text).map_err(|e| {
            let msg = format!("Failed to parse {} API response wrapper: {}", provider, e);
            error!("{}", msg);
            FraudLensError::Generation(msg)
        })
    }

    /// Anthropic messages API. Schema guidance goes through the system
    /// prompt; the response text lives at `content[0].text`.
    async fn call_claude(&self, prompt: &str) -> Result<String, FraudLensError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let request = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json");

        let resp_json = self.post_json(request, &body).await?;
        resp_json["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                let msg = "No text content in Claude API response".to_string();
                error!("{}", msg);
                FraudLensError::Generation(msg)
            })
    }

    /// OpenAI-shaped chat completions, shared by OpenAI and OpenRouter.
    /// OpenAI gets the strict `json_schema` response format; OpenRouter gets
    /// plain `json_object` mode, which routes more reliably across models.
    async fn call_chat_completions(
        &self,
        url: &str,
        prompt: &str,
        schema: Option<&Value>,
    ) -> Result<String, FraudLensError> {
        let response_format = match schema {
            Some(schema) => serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "dashboard_narrative",
                    "strict": true,
                    "schema": schema
                }
            }),
            None => serde_json::json!({ "type": "json_object" }),
        };

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "response_format": response_format
        });

        let request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        let resp_json = self.post_json(request, &body).await?;
        resp_json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                let msg = format!("No content in {} API response", self.provider.label());
                error!("{}", msg);
                FraudLensError::Generation(msg)
            })
    }
}

impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String, FraudLensError> {
        match self.provider {
            Provider::Claude => self.call_claude(prompt).await,
            Provider::OpenAi => {
                self.call_chat_completions(
                    "https://api.openai.com/v1/chat/completions",
                    prompt,
                    Some(schema),
                )
                .await
            }
            Provider::OpenRouter => {
                self.call_chat_completions(
                    "https://openrouter.ai/api/v1/chat/completions",
                    prompt,
                    None,
                )
                .await
            }
        }
    }
}
