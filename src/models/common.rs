use serde::{Deserialize, Serialize};

/// User-selected transformation workflow. Fixed at request-build time;
/// determines required inputs, attachment ordering, and prompt composition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    StyleRemix,
    FaceSwap,
    Edit,
    Generate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelVersion {
    #[serde(rename = "gemini-3-pro-image-preview")]
    Gemini3ProImage,
    #[serde(rename = "gemini-2.5-flash-image")]
    Gemini25FlashImage,
}

impl ModelVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVersion::Gemini3ProImage => "gemini-3-pro-image-preview",
            ModelVersion::Gemini25FlashImage => "gemini-2.5-flash-image",
        }
    }

    /// Variable output size is only available on the Pro model.
    pub fn supports_resolution(&self) -> bool {
        matches!(self, ModelVersion::Gemini3ProImage)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResolutionTier {
    #[serde(rename = "1K")]
    Res1K,
    #[serde(rename = "2K")]
    Res2K,
    #[serde(rename = "4K")]
    Res4K,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Res1K => "1K",
            ResolutionTier::Res2K => "2K",
            ResolutionTier::Res4K => "4K",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "4:3")]
    StandardLandscape,
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::StandardLandscape => "4:3",
            AspectRatio::StandardPortrait => "3:4",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_pro_model_supports_resolution() {
        assert!(ModelVersion::Gemini3ProImage.supports_resolution());
        assert!(!ModelVersion::Gemini25FlashImage.supports_resolution());
    }

    #[test]
    fn wire_strings_match_the_api() {
        assert_eq!(ModelVersion::Gemini3ProImage.as_str(), "gemini-3-pro-image-preview");
        assert_eq!(ResolutionTier::Res4K.as_str(), "4K");
        assert_eq!(AspectRatio::Portrait.as_str(), "9:16");
    }
}
