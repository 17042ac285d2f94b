//! Turns a mode plus raw user inputs into a fully-specified generation
//! request, or fails validation before any network work happens.

use crate::error::{GeminiError, Result};
use crate::models::{
    AspectRatio, Attachment, ImageGenerationRequest, Mode, ModelVersion, OutputConfig, RawInputs,
    ResolutionTier,
};

/// Build the request for one generation attempt sequence. Pure: no I/O, no
/// retry state. Validation failures surface as `MissingInput` naming the
/// empty slot and must prevent any network call.
pub fn build_request(mode: Mode, inputs: &RawInputs) -> Result<ImageGenerationRequest> {
    // All workflows currently run on the higher-capability model.
    let model = ModelVersion::Gemini3ProImage;

    let (prompt, attachments) = match mode {
        Mode::StyleRemix => {
            let (style, subject) = match (&inputs.reference_one, &inputs.reference_two) {
                (Some(style), Some(subject)) => (style.clone(), subject.clone()),
                _ => {
                    return Err(GeminiError::MissingInput(
                        "Please upload both Reference and Subject images.".into(),
                    ))
                }
            };
            (
                style_remix_prompt(&inputs.prompt),
                vec![style.into(), subject.into()],
            )
        }
        Mode::FaceSwap => {
            let (face, target) = match (&inputs.reference_one, &inputs.reference_two) {
                (Some(face), Some(target)) => (face.clone(), target.clone()),
                _ => {
                    return Err(GeminiError::MissingInput(
                        "Please upload both Face Reference and Target Image.".into(),
                    ))
                }
            };
            // Attachment order: target body first, face reference second.
            (
                face_swap_prompt(&inputs.prompt),
                vec![target.into(), face.into()],
            )
        }
        Mode::Edit => {
            let image = inputs.reference_one.clone().ok_or_else(|| {
                GeminiError::MissingInput("Please upload an image to edit.".into())
            })?;
            if inputs.prompt.trim().is_empty() {
                return Err(GeminiError::MissingInput(
                    "Please describe the edit to apply.".into(),
                ));
            }
            (edit_prompt(&inputs.prompt), vec![Attachment::from(image)])
        }
        Mode::Generate => {
            if inputs.prompt.trim().is_empty() {
                return Err(GeminiError::MissingInput(
                    "Please enter a text prompt.".into(),
                ));
            }
            (inputs.prompt.clone(), Vec::new())
        }
    };

    Ok(ImageGenerationRequest {
        prompt,
        model,
        attachments,
        output: OutputConfig {
            aspect_ratio: inputs.aspect_ratio.unwrap_or(AspectRatio::Square),
            // Silently omitted for models without variable output size.
            resolution: model
                .supports_resolution()
                .then(|| inputs.resolution.unwrap_or(ResolutionTier::Res1K)),
        },
    })
}

fn style_remix_prompt(user_text: &str) -> String {
    let action = if user_text.trim().is_empty() {
        "A candid, high-end Instagram influencer shot."
    } else {
        user_text
    };

    format!(
        "Generate a hyper-realistic, premium lifestyle photograph merging these two references.\n\
         \n\
         REFERENCE 1 (Background/Style): Use this image's environment, lighting, and color palette.\n\
         REFERENCE 2 (Subject): Use this person, preserving their exact clothing and identity.\n\
         \n\
         ACTION/CONTEXT: {}\n\
         \n\
         REQUIREMENTS:\n\
         1. Photorealism: Must look like a real photo (depth of field, texture, natural lighting).\n\
         2. Clothing Fidelity: Keep the subject's outfit from Reference 2 EXACT, including any text or logos.\n\
         3. Atmosphere: Premium, \"quiet luxury\" or high-end streetwear aesthetic.\n\
         4. Composition: The subject should be naturally integrated into the background from Reference 1.",
        action
    )
}

fn face_swap_prompt(user_text: &str) -> String {
    let mut prompt = String::from(
        "Edit the first image (Target Image) by replacing the main subject's face with the face from the second image (Face Reference).\n\
         \n\
         INSTRUCTIONS:\n\
         - Swap the face seamlessly.\n\
         - Maintain the lighting, skin tone match, grain, and angle of the Target Image.\n\
         - Preserve the facial identity (eyes, nose, mouth structure) of the Face Reference.\n\
         - Ensure the expression matches the context of the target image unless specified otherwise.",
    );
    if !user_text.trim().is_empty() {
        prompt.push_str(&format!("\n- User Note: {}", user_text));
    }
    prompt
}

fn edit_prompt(user_text: &str) -> String {
    format!("Edit this image: {}", user_text)
}
