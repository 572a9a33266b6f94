// Runtime configuration, loaded from the environment (or a .env file) with
// defaults for everything except the API key.

use std::{env, time::Duration};

use thiserror::Error;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Upper bound on tokens the completion service may generate per turn.
pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.8;

lazy_static::lazy_static! {
    pub static ref OPENROUTER_BASE_URL: String = env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());
    pub static ref PICKUP_LINES_MODEL: String = env::var("PICKUP_LINES_MODEL").unwrap_or_else(|_| "google/gemini-2.5-flash-preview-09-2025".to_string());
    // Sent as the HTTP-Referer and X-Title headers so the provider can attribute traffic.
    pub static ref APP_URL: String = env::var("APP_URL").unwrap_or_else(|_| "https://pickup-lines-generator.vercel.app".to_string());
    pub static ref APP_NAME: String = env::var("APP_NAME").unwrap_or_else(|_| "Pickup Lines Generator".to_string());
    pub static ref COMPLETION_TIMEOUT_SECS: u64 = env::var("COMPLETION_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY is not set; refusing to start without a completion API key")]
    MissingApiKey,
}

/// Everything the completion client needs to reach the backend.
#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub app_url: String,
    pub app_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl CompletionConfig {
    /// Reads the configuration from the environment. A missing or empty API
    /// key is an error; there is no built-in default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        Ok(Self::with_api_key(api_key))
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.clone(),
            api_key: api_key.into(),
            model: PICKUP_LINES_MODEL.clone(),
            app_url: APP_URL.clone(),
            app_name: APP_NAME.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            timeout: Duration::from_secs(*COMPLETION_TIMEOUT_SECS),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
