//! OpenAI-compatible chat-completions client

use codeaudit_types::OracleError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// AI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Chat-completions endpoint URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; optional for local providers
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:11434/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    30
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// system / user / assistant
    pub role: String,
    /// Message text
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Thin client over an OpenAI-compatible chat endpoint.
///
/// Every call is bounded by the configured timeout; a timed-out or failed
/// call surfaces as an [`OracleError`] for the caller to recover from.
pub struct AiClient {
    config: AiConfig,
    client: reqwest::Client,
}

impl AiClient {
    /// Build a client with the configured request timeout
    pub fn new(config: AiConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::RequestFailed(e.to_string()))?;
        Ok(AiClient { config, client })
    }

    /// Send a system + user prompt pair, returning the assistant text
    pub async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError> {
        let payload = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            stream: false,
        };

        let mut request = self.client.post(&self.config.api_url).json(&payload);
        if let Some(api_key) = self.config.api_key.as_deref() {
            if !api_key.is_empty() {
                request = request.bearer_auth(api_key);
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.config.timeout_secs)
            } else {
                OracleError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(200).collect();
            return Err(OracleError::ApiResponse(status.as_u16(), detail));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OracleError::ResponseParseFailed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OracleError::ResponseParseFailed("response has no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config: AiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_none());
        assert!(config.api_url.contains("/chat/completions"));
    }

    #[test]
    fn completion_response_decodes() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"overall_score\":88}"}}]}"#;
        let decoded: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.choices[0].message.content, "{\"overall_score\":88}");
    }
}
