use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::{
    completion::{ChatCompletions, ChatMessage, ChatRequest},
    error::{AppError, UpstreamError},
    prompt::build_caption_prompt,
};

pub const CAPTION_TEMPERATURE: f32 = 0.7;
pub const CAPTION_MAX_TOKENS: u32 = 100;

/// Body of `POST /generate-caption`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRequest {
    #[serde(rename = "imageType")]
    pub category: String,
    pub vibes: Vec<String>,
    #[serde(rename = "additionalInfo", default, deserialize_with = "null_as_empty")]
    pub context: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CaptionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.category.trim().is_empty() {
            return Err(AppError::InvalidRequest("An image type is required".to_string()));
        }
        if self.vibes.is_empty() {
            return Err(AppError::InvalidRequest(
                "At least one vibe is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResult {
    pub text: String,
}

#[derive(Clone)]
pub struct CaptionGenerator {
    client: Arc<dyn ChatCompletions>,
    model: String,
}

impl CaptionGenerator {
    pub fn new(client: Arc<dyn ChatCompletions>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResult, AppError> {
        let prompt = build_caption_prompt(&request.category, &request.vibes, &request.context);
        let chat = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
            temperature: Some(CAPTION_TEMPERATURE),
            max_tokens: Some(CAPTION_MAX_TOKENS),
        };

        let response = self
            .client
            .complete(&chat)
            .await
            .map_err(AppError::CaptionGenerationFailed)?;

        let text = response
            .first_content()
            .map_err(AppError::CaptionGenerationFailed)?
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AppError::CaptionGenerationFailed(UpstreamError::Malformed(
                    "first choice has no content".to_string(),
                ))
            })?
            .to_string();

        info!(category = %request.category, caption = %text, "Caption generated");
        Ok(CaptionResult { text })
    }
}
