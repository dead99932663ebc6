//! Generation capability seen by the turn controller.
//!
//! Failures never escape as errors: every problem is folded into
//! `GenerationOutcome::GenerationFailed` so the turn can still be spoken.

use super::client::{GeminiLLM, LLMError};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("empty response")]
    EmptyResponse,
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl From<LLMError> for GenerationFailure {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::ParseError(detail) => GenerationFailure::MalformedResponse(detail),
            other => GenerationFailure::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(String),
    GenerationFailed(GenerationFailure),
}

impl GenerationOutcome {
    /// Trim raw model output; nothing left means failure
    pub fn from_text(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            GenerationOutcome::GenerationFailed(GenerationFailure::EmptyResponse)
        } else {
            GenerationOutcome::Generated(text.to_string())
        }
    }
}

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32)
        -> GenerationOutcome;
}

/// Gemini-backed generator
pub struct GeminiGenerator {
    llm: GeminiLLM,
}

impl GeminiGenerator {
    pub fn new(llm: GeminiLLM) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResponseGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> GenerationOutcome {
        log::debug!(
            "🤖 Requesting generation ({} chars, max {} tokens)",
            prompt.len(),
            max_tokens
        );

        match self.llm.generate(prompt, max_tokens, temperature).await {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    log::debug!(
                        "📨 {} replied with {} tokens (finish: {:?})",
                        response.model,
                        usage.completion_tokens,
                        response.finish_reason
                    );
                }
                GenerationOutcome::from_text(&response.content)
            }
            Err(e) => GenerationOutcome::GenerationFailed(e.into()),
        }
    }
}
