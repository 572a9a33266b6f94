use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    intensity::{self, Intensity},
    lines::LineSet,
    llm_interaction::CompletionClient,
    prompt::build_prompt,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("用户消息不能为空")]
    EmptyMessage,
}

/// One user turn, as posted by the chat page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default, deserialize_with = "intensity::lenient")]
    pub intensity: Intensity,
}

impl GenerateRequest {
    pub fn new(user_message: impl Into<String>, intensity: Intensity) -> Self {
        Self {
            user_message: Some(user_message.into()),
            intensity,
        }
    }

    /// Returns the message to answer. Only a missing or empty message is
    /// rejected; whitespace is passed through untouched.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        match self.user_message.as_deref() {
            Some(message) if !message.is_empty() => Ok(message),
            _ => Err(ValidationError::EmptyMessage),
        }
    }
}

/// Produces the replies for one turn. Holds no per-request state, so a single
/// instance is shared by every handler.
#[derive(Clone, Debug)]
pub struct PickupLineGenerator {
    completion: CompletionClient,
}

impl PickupLineGenerator {
    pub fn new(completion: CompletionClient) -> Self {
        Self { completion }
    }

    /// Validates the request, then asks the completion service once. Any
    /// upstream failure is logged and answered from the local fallback pools.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<LineSet, ValidationError> {
        let message = request.validate()?;
        Ok(self.lines_for(message, request.intensity).await)
    }

    pub async fn lines_for(&self, message: &str, intensity: Intensity) -> LineSet {
        let prompt = build_prompt(message, intensity);
        match self.completion.complete(&prompt).await {
            Ok(raw) => {
                let lines = LineSet::normalize(&raw);
                debug!(?lines, "Normalized completion");
                lines
            }
            Err(e) => {
                warn!(error = %e, intensity = intensity.value(), "Completion failed, using fallback lines");
                let lines = LineSet::fallback(intensity);
                info!(count = lines.len(), "Served fallback lines");
                lines
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: GenerateRequest =
            serde_json::from_value(json!({ "userMessage": "你好", "intensity": 8 })).unwrap();
        assert_eq!(req.validate(), Ok("你好"));
        assert_eq!(req.intensity, Intensity::from(8));
    }

    #[test]
    fn test_missing_intensity_defaults_to_five() {
        let req: GenerateRequest = serde_json::from_value(json!({ "userMessage": "hi" })).unwrap();
        assert_eq!(req.intensity, Intensity::default());

        let req: GenerateRequest =
            serde_json::from_value(json!({ "userMessage": "hi", "intensity": "loud" })).unwrap();
        assert_eq!(req.intensity, Intensity::default());
    }

    #[test]
    fn test_empty_or_missing_message_is_rejected() {
        let empty: GenerateRequest = serde_json::from_value(json!({ "userMessage": "" })).unwrap();
        assert_eq!(empty.validate(), Err(ValidationError::EmptyMessage));

        let missing: GenerateRequest = serde_json::from_value(json!({ "intensity": 3 })).unwrap();
        assert_eq!(missing.validate(), Err(ValidationError::EmptyMessage));

        let null: GenerateRequest = serde_json::from_value(json!({ "userMessage": null })).unwrap();
        assert_eq!(null.validate(), Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn test_whitespace_message_is_accepted() {
        let req = GenerateRequest::new("   ", Intensity::default());
        assert_eq!(req.validate(), Ok("   "));
    }
}
