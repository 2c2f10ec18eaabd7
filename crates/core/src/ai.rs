//! Size and aspect policy for text-to-image providers.
//!
//! Each provider family accepts a different request geometry; the
//! device's orientation and native resolution pick the closest match.
//! The HTTP calls themselves live in the API crate.

use std::str::FromStr;

use crate::error::CoreError;

/// Supported text-to-image providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Google,
}

impl FromStr for AiProvider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(AiProvider::OpenAi),
            "google" => Ok(AiProvider::Google),
            other => Err(CoreError::Validation(format!(
                "unsupported AI provider: {other}"
            ))),
        }
    }
}

/// Size string for the OpenAI images endpoint.
///
/// dall-e-3 supports 1024x1792 / 1792x1024; dall-e-2 only squares;
/// newer image models use the 1024x1536 / 1536x1024 pair.
pub fn openai_size(model: &str, portrait: bool) -> &'static str {
    if model.contains("dall-e-3") {
        if portrait {
            "1024x1792"
        } else {
            "1792x1024"
        }
    } else if model.contains("dall-e-2") {
        "1024x1024"
    } else if portrait {
        "1024x1536"
    } else {
        "1536x1024"
    }
}

/// Aspect ratio string for Gemini image generation.
pub fn gemini_aspect_ratio(portrait: bool) -> &'static str {
    if portrait {
        "3:4"
    } else {
        "4:3"
    }
}

/// `imageSize` for the gemini-3 family, picked from the largest native
/// panel dimension. Older Gemini models ignore the field, so `None`.
pub fn gemini_image_size(model: &str, native_w: i64, native_h: i64) -> Option<&'static str> {
    if !model.contains("gemini-3") {
        return None;
    }
    let max_dim = native_w.max(native_h);
    Some(if max_dim > 2048 {
        "4K"
    } else if max_dim > 1024 {
        "2K"
    } else {
        "1K"
    })
}
