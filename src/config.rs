use crate::llm::prompts::ConversationTemplates;
use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Environment error: {0}")]
    EnvError(#[from] env::VarError),
}

/// Credentials for the generation service
#[derive(Debug)]
pub struct ApiConfig {
    pub google_key: SecretBox<String>,
}

impl ApiConfig {
    /// Load API configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let google_key = Self::load_api_key(GOOGLE_API_KEY_VAR, "Google AI")?;

        Ok(Self { google_key })
    }

    /// Load a single API key from environment; blank counts as unset
    fn load_api_key(env_var: &str, service_name: &str) -> Result<SecretBox<String>, ConfigError> {
        let key = env::var(env_var).map_err(|_| ConfigError::MissingEnvVar(env_var.to_string()))?;

        if key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar(env_var.to_string()));
        }

        if !Self::looks_like_google_key(&key) {
            log::warn!(
                "{} key does not start with 'AIza'; requests may be rejected",
                service_name
            );
        }

        Ok(SecretBox::new(Box::new(key)))
    }

    /// Google AI Studio keys start with "AIza"
    fn looks_like_google_key(key: &str) -> bool {
        key.starts_with("AIza")
    }

    /// Get Google API key (use only when making API calls)
    pub fn google_key(&self) -> &str {
        self.google_key.expose_secret()
    }
}

/// Load configuration with helpful error messages for development
pub fn load_config() -> Result<ApiConfig, ConfigError> {
    match ApiConfig::load() {
        Ok(config) => {
            log::info!("Successfully loaded API configuration");
            Ok(config)
        }
        Err(ConfigError::MissingEnvVar(var)) => {
            log::error!("Missing required environment variable: {}", var);
            log::error!("Create a .env file in the project root with:");
            log::error!("{}=your_api_key_here", var);
            Err(ConfigError::MissingEnvVar(var))
        }
        Err(e) => {
            log::error!("Configuration error: {}", e);
            Err(e)
        }
    }
}

/// Tunables for the turn loop
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Substring that ends the conversation when heard
    pub termination_keyword: String,
    pub farewell: String,
    /// Spoken in place of a reply when generation fails
    pub fallback_reply: String,
    /// Spoken when nothing usable was recognized
    pub apology: String,
    /// Spoken when the recognizer itself failed
    pub service_apology: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub generation_timeout: Duration,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            termination_keyword: "종료".to_string(),
            farewell: ConversationTemplates::goodbye().to_string(),
            fallback_reply: ConversationTemplates::generation_unavailable().to_string(),
            apology: ConversationTemplates::not_understood().to_string(),
            service_apology: ConversationTemplates::recognition_unavailable().to_string(),
            max_tokens: 100,
            temperature: 0.3,
            generation_timeout: Duration::from_secs(30),
        }
    }
}
