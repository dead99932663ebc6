use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Response parsing error: {0}")]
    ParseError(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub model: String,
    /// Transport-level ceiling, independent of the turn timeout
    pub request_timeout: Duration,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[derive(Debug)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

pub struct GeminiLLM {
    client: Client,
    api_key: String,
    base_url: String,
    config: LLMConfig,
}

impl GeminiLLM {
    pub fn new(api_key: String) -> Result<Self, LLMError> {
        Self::with_config(api_key, LLMConfig::default())
    }

    pub fn with_config(api_key: String, config: LLMConfig) -> Result<Self, LLMError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            config,
        })
    }

    /// Point the client at another endpoint (proxies, local mocks)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    /// Generate a completion for a single-turn prompt
    pub async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<LLMResponse, LLMError> {
        if self.api_key.is_empty() {
            return Err(LLMError::Config("API key is empty".to_string()));
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.config.model
        );

        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "maxOutputTokens": max_tokens,
                "temperature": temperature
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        self.parse_response(&response_text)
    }

    /// Parse the JSON body of a generateContent call
    fn parse_response(&self, response_text: &str) -> Result<LLMResponse, LLMError> {
        let json: Value = serde_json::from_str(response_text)
            .map_err(|e| LLMError::ParseError(format!("Invalid JSON: {}", e)))?;

        if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
            return Err(LLMError::ParseError(format!("Prompt blocked: {}", reason)));
        }

        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| LLMError::ParseError("Missing 'candidates' field".to_string()))?;

        let first_candidate = candidates
            .first()
            .ok_or_else(|| LLMError::ParseError("Empty candidates array".to_string()))?;

        let parts = first_candidate["content"]["parts"]
            .as_array()
            .ok_or_else(|| LLMError::ParseError("Missing 'content.parts' field".to_string()))?;

        let content = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<String>();

        let finish_reason = first_candidate["finishReason"]
            .as_str()
            .map(|s| s.to_string());

        let model = json["modelVersion"]
            .as_str()
            .unwrap_or(&self.config.model)
            .to_string();

        let usage = json.get("usageMetadata").map(|usage_json| Usage {
            prompt_tokens: usage_json["promptTokenCount"].as_u64().unwrap_or(0) as u32,
            completion_tokens: usage_json["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
            total_tokens: usage_json["totalTokenCount"].as_u64().unwrap_or(0) as u32,
        });

        Ok(LLMResponse {
            content,
            usage,
            model,
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiLLM {
        GeminiLLM::new("AIzaTestKey".to_string()).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = LLMConfig::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "안녕"}, {"text": "하세요 "}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3, "totalTokenCount": 10},
            "modelVersion": "gemini-1.5-flash-002"
        }"#;

        let response = client().parse_response(body).unwrap();
        assert_eq!(response.content, "안녕하세요 ");
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.model, "gemini-1.5-flash-002");
        assert_eq!(response.usage.unwrap().total_tokens, 10);
    }

    #[test]
    fn test_parse_missing_candidates() {
        let result = client().parse_response(r#"{"usageMetadata": {}}"#);
        assert!(matches!(result, Err(LLMError::ParseError(_))));
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let result = client().parse_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        match result {
            Err(LLMError::ParseError(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("Expected ParseError, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(client().parse_response("not json").is_err());
    }

    #[test]
    fn test_base_url_override() {
        let llm = client().with_base_url("http://127.0.0.1:9999/");
        assert_eq!(llm.base_url, "http://127.0.0.1:9999");
    }
}
