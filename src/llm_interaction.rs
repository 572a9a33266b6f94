use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::constants::CompletionConfig;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("invalid header value for {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("completion API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to parse completion response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("completion response contained no content")]
    EmptyContent,
}

// Request/response shapes of an OpenAI-compatible /chat/completions endpoint.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

/// Thin client for the text-completion backend: one prompt in, one text out.
#[derive(Clone, Debug)]
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let header = |name: &'static str, value: &str| {
            HeaderValue::from_str(value).map_err(|source| CompletionError::InvalidHeader { name, source })
        };

        let mut headers = HeaderMap::new();
        let mut auth = header("Authorization", &format!("Bearer {}", config.api_key))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("http-referer", header("HTTP-Referer", &config.app_url)?);
        headers.insert("x-title", header("X-Title", &config.app_name)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(CompletionError::Client)?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Sends `prompt` as a single user turn and returns the first choice's text.
    /// Any failure, including an empty reply, is an error; there are no retries.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request_payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(?prompt, "Sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_payload)
            .send()
            .await
            .map_err(|source| CompletionError::Transport {
                url: self.endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Completion API request failed");
            return Err(CompletionError::Status { status, body });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(CompletionError::Decode)?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyContent)?;

        debug!(response = ?content, "Received completion");
        Ok(content)
    }
}
