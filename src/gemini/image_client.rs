use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    config::GeminiConfig,
    credentials::ApiKeyProvider,
    error::{GeminiError, Result},
    gemini::GenerationService,
    models::{GenerateContentResponse, ImageGenerationRequest, ImageGenerationResponse},
};

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    config: GeminiConfig,
    key_provider: Arc<dyn ApiKeyProvider>,
}

impl ImageClient {
    pub fn new(config: GeminiConfig, key_provider: Arc<dyn ApiKeyProvider>) -> Self {
        Self {
            client: Client::new(),
            config,
            key_provider,
        }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("gemini-3-pro-image-preview", "Nano Banana Pro", "Google"),
            ("gemini-2.5-flash-image", "Nano Banana", "Google"),
        ]
    }

    /// One attempt against `generateContent`. The attachments go out first,
    /// each as base64 inline data with its MIME type, then the prompt as a
    /// trailing text part.
    pub async fn generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        // Fresh key on every call so a changed credential applies to the
        // next invocation.
        let api_key = self.key_provider.api_key()?;

        let model_id = request.model.as_str();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            model_id
        );
        let payload = build_payload(request);

        log::info!("Generating image with model: {}", model_id);
        log::debug!(
            "{} attachment(s), aspect ratio {}",
            request.attachments.len(),
            request.output.aspect_ratio.as_str()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GeminiError::HttpError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            return Err(GeminiError::ServiceError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::ResponseError(e.to_string()))?;

        match parsed.first_inline_image() {
            Some(inline) => Ok(ImageGenerationResponse {
                image_data: inline.data.clone(),
                mime_type: inline.mime_type.clone(),
                model: model_id.to_string(),
            }),
            None => Err(GeminiError::NoImage(
                "No image generated in the response.".into(),
            )),
        }
    }
}

#[async_trait]
impl GenerationService for ImageClient {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse> {
        ImageClient::generate(self, request).await
    }
}

fn build_payload(request: &ImageGenerationRequest) -> Value {
    let mut parts: Vec<Value> = request
        .attachments
        .iter()
        .map(|attachment| {
            json!({
                "inlineData": {
                    "mimeType": attachment.mime_type,
                    "data": BASE64.encode(&attachment.bytes),
                }
            })
        })
        .collect();
    parts.push(json!({ "text": request.prompt }));

    let mut image_config = json!({ "aspectRatio": request.output.aspect_ratio.as_str() });
    if let Some(resolution) = request.output.resolution {
        image_config["imageSize"] = json!(resolution.as_str());
    }

    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": { "imageConfig": image_config },
    })
}

/// Pull the human-readable message out of a Gemini error body, falling back
/// to the raw body when it is not the usual `{"error": {...}}` shape.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let error = &value["error"];
        if let Some(message) = error["message"].as_str() {
            return match error["status"].as_str() {
                Some(status_word) => format!("{}: {}", status_word, message),
                None => message.to_string(),
            };
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AspectRatio, Attachment, ModelVersion, OutputConfig, ResolutionTier,
    };

    fn request(model: ModelVersion, resolution: Option<ResolutionTier>) -> ImageGenerationRequest {
        ImageGenerationRequest {
            prompt: "a lighthouse at dusk".into(),
            model,
            attachments: vec![
                Attachment {
                    bytes: b"one".to_vec(),
                    mime_type: "image/jpeg".into(),
                },
                Attachment {
                    bytes: b"two".to_vec(),
                    mime_type: "image/png".into(),
                },
            ],
            output: OutputConfig {
                aspect_ratio: AspectRatio::Landscape,
                resolution,
            },
        }
    }

    #[test]
    fn payload_orders_attachments_before_the_text_part() {
        let payload = build_payload(&request(
            ModelVersion::Gemini3ProImage,
            Some(ResolutionTier::Res2K),
        ));
        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0]["inlineData"]["mimeType"].as_str().unwrap(),
            "image/jpeg"
        );
        assert_eq!(
            parts[0]["inlineData"]["data"].as_str().unwrap(),
            BASE64.encode(b"one")
        );
        assert_eq!(
            parts[1]["inlineData"]["mimeType"].as_str().unwrap(),
            "image/png"
        );
        assert_eq!(
            parts[2]["text"].as_str().unwrap(),
            "a lighthouse at dusk"
        );
    }

    #[test]
    fn payload_carries_resolution_for_the_pro_model() {
        let payload = build_payload(&request(
            ModelVersion::Gemini3ProImage,
            Some(ResolutionTier::Res4K),
        ));
        let image_config = &payload["generationConfig"]["imageConfig"];
        assert_eq!(image_config["aspectRatio"].as_str().unwrap(), "16:9");
        assert_eq!(image_config["imageSize"].as_str().unwrap(), "4K");
    }

    #[test]
    fn payload_omits_resolution_when_the_descriptor_has_none() {
        // A descriptor built against the flash model never carries a tier,
        // even if the user picked 4K upstream.
        let payload = build_payload(&request(ModelVersion::Gemini25FlashImage, None));
        let image_config = &payload["generationConfig"]["imageConfig"];
        assert_eq!(image_config["aspectRatio"].as_str().unwrap(), "16:9");
        assert!(image_config.get("imageSize").is_none());
    }

    #[test]
    fn error_message_prefers_the_structured_body() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded for requests", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            error_message(body),
            "RESOURCE_EXHAUSTED: Quota exceeded for requests"
        );
        assert_eq!(error_message("plain text"), "plain text");
    }
}
