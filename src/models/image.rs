use serde::{Deserialize, Serialize};

use crate::error::ErrorClass;
use crate::models::common::{AspectRatio, ModelVersion, ResolutionTier};

/// A user-supplied reference image: opaque bytes plus MIME type. The crate
/// never decodes image content, it only encodes bytes for transport.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Everything the user can edit before pressing "generate". The two slots
/// mirror the uploader pair: slot one holds the style reference, face
/// reference, or image to edit; slot two holds the subject or target body.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub reference_one: Option<ReferenceImage>,
    pub reference_two: Option<ReferenceImage>,
    pub prompt: String,
    pub resolution: Option<ResolutionTier>,
    pub aspect_ratio: Option<AspectRatio>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_one(mut self, image: ReferenceImage) -> Self {
        self.reference_one = Some(image);
        self
    }

    pub fn with_reference_two(mut self, image: ReferenceImage) -> Self {
        self.reference_two = Some(image);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_resolution(mut self, resolution: ResolutionTier) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }
}

/// One ordered content attachment. Order is semantically significant: the
/// prompt templates refer to attachments by position.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl From<ReferenceImage> for Attachment {
    fn from(image: ReferenceImage) -> Self {
        Self {
            bytes: image.bytes,
            mime_type: image.mime_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub aspect_ratio: AspectRatio,
    /// Present only when the selected model supports variable output size.
    pub resolution: Option<ResolutionTier>,
}

/// Fully composed specification of one generation call. Built once per
/// attempt sequence by `compose::build_request` and treated as immutable
/// from then on.
#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model: ModelVersion,
    pub attachments: Vec<Attachment>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct ImageGenerationResponse {
    /// Base64 encoded image payload.
    pub image_data: String,
    pub mime_type: String,
    pub model: String,
}

/// Result of one whole attempt sequence, consumed immediately by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success { image: String },
    Failure { class: ErrorClass, message: String },
}

// Wire types for the `generateContent` response body. Only the fields the
// extractor reads are modeled.

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
    #[serde(rename = "inlineData")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentResponse {
    /// First inline image payload across all candidates, in order.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.inline_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_inline_image_skips_text_parts_and_empty_candidates() {
        let body = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "thinking..." } ] } },
                { "content": { "parts": [
                    { "text": "here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "QUJD" } },
                    { "inlineData": { "mimeType": "image/png", "data": "REVG" } }
                ] } }
            ]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let image = response.first_inline_image().unwrap();
        assert_eq!(image.data, "QUJD");
    }

    #[test]
    fn first_inline_image_is_none_for_text_only_response() {
        let body = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "I cannot do that" } ] } }
            ]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert!(response.first_inline_image().is_none());
    }
}
