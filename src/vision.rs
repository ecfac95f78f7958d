use std::sync::Arc;

use tracing::info;

use crate::{
    completion::{ChatCompletions, ChatMessage, ChatRequest, ContentPart, ImageUrl},
    error::AppError,
    image::ImageReference,
};

pub const DESCRIBE_INSTRUCTION: &str = "Describe this image in three sentences.";

#[derive(Clone)]
pub struct ImageDescriber {
    client: Arc<dyn ChatCompletions>,
    model: String,
}

impl ImageDescriber {
    pub fn new(client: Arc<dyn ChatCompletions>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Returns an empty string when the model answers without content.
    pub async fn describe(&self, image: &ImageReference) -> Result<String, AppError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: DESCRIBE_INSTRUCTION.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.to_url(),
                    },
                },
            ])],
            temperature: None,
            max_tokens: None,
        };

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(AppError::ImageAnalysisFailed)?;

        let description = response
            .first_content()
            .map_err(AppError::ImageAnalysisFailed)?
            .unwrap_or_default()
            .to_string();

        info!(chars = description.len(), "Image described");
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{completion::HttpChatClient, config::CompletionConfig};

    fn describer_for(server: &MockServer) -> ImageDescriber {
        let client = HttpChatClient::new(
            reqwest::Client::new(),
            &CompletionConfig {
                base_url: server.uri(),
                api_key: "gsk-test".to_string(),
                caption_model: "text-model".to_string(),
                vision_model: "vision-model".to_string(),
            },
        );
        ImageDescriber::new(Arc::new(client), "vision-model")
    }

    #[tokio::test]
    async fn test_describe_attaches_image_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "vision-model",
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": DESCRIBE_INSTRUCTION },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAEC" } }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "A cat. On a mat. Asleep." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let description = describer_for(&server)
            .describe(&ImageReference::Inline {
                bytes: vec![0, 1, 2],
                media_type: "image/png".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(description, "A cat. On a mat. Asleep.");
    }

    #[tokio::test]
    async fn test_absent_content_is_empty_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant" } }]
            })))
            .mount(&server)
            .await;

        let description = describer_for(&server)
            .describe(&ImageReference::Remote {
                url: "https://host/x.jpg".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(description, "");
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = describer_for(&server)
            .describe(&ImageReference::Remote {
                url: "https://host/x.jpg".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ImageAnalysisFailed(_)));
    }
}
