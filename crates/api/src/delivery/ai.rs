//! Text-to-image generation against external providers.
//!
//! The device record carries the provider, model, and prompt; the API
//! keys live in settings. Size/aspect policy is pure and lives in
//! `framecast_core::ai`. At most one image is requested; base64
//! payloads are preferred, URL-only responses are downloaded.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use framecast_core::ai::{gemini_aspect_ratio, gemini_image_size, openai_size, AiProvider};
use framecast_core::error::CoreError;
use framecast_db::models::device::Device;
use framecast_db::repositories::SettingRepo;
use framecast_db::DbPool;
use image::DynamicImage;
use serde::Deserialize;
use serde_json::json;

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Generation can take a while; providers advertise up to two minutes.
const AI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    data: Vec<OpenAiDatum>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDatum {
    #[serde(default)]
    b64_json: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default, rename = "inlineData")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiInlineData {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Clone)]
pub struct AiImager {
    http: reqwest::Client,
    openai_url: String,
    gemini_base_url: String,
}

impl Default for AiImager {
    fn default() -> Self {
        Self::new()
    }
}

impl AiImager {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(AI_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            openai_url: OPENAI_IMAGES_URL.to_string(),
            gemini_base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Generate a fresh image from the device's AI configuration.
    pub async fn generate(&self, pool: &DbPool, device: &Device) -> Result<DynamicImage, CoreError> {
        if device.ai_prompt.is_empty() {
            return Err(CoreError::Validation(format!(
                "AI prompt not configured for device {}",
                device.name
            )));
        }
        if device.ai_model.is_empty() {
            return Err(CoreError::Validation(format!(
                "AI model not configured for device {}",
                device.name
            )));
        }
        let provider: AiProvider = device.ai_provider.parse()?;

        // Orientation override wins; otherwise fall back to the panel
        // dimensions.
        let portrait = match device.orientation.as_str() {
            "portrait" => true,
            "landscape" => false,
            _ => device.height > device.width,
        };

        tracing::info!(
            device = %device.name,
            provider = %device.ai_provider,
            model = %device.ai_model,
            portrait,
            "Generating AI image"
        );

        match provider {
            AiProvider::OpenAi => {
                self.generate_openai(pool, &device.ai_prompt, &device.ai_model, portrait)
                    .await
            }
            AiProvider::Google => {
                self.generate_gemini(
                    pool,
                    &device.ai_prompt,
                    &device.ai_model,
                    portrait,
                    device.width,
                    device.height,
                )
                .await
            }
        }
    }

    async fn generate_openai(
        &self,
        pool: &DbPool,
        prompt: &str,
        model: &str,
        portrait: bool,
    ) -> Result<DynamicImage, CoreError> {
        let api_key = require_key(pool, "openai_api_key", "OpenAI").await?;

        let size = openai_size(model, portrait);
        let mut body = json!({
            "model": model,
            "prompt": prompt,
            "n": 1,
            "size": size,
        });
        if model.contains("dall-e-3") {
            body["quality"] = json!("hd");
            body["style"] = json!("vivid");
            body["response_format"] = json!("b64_json");
        } else if model.contains("dall-e-2") {
            body["response_format"] = json!("b64_json");
        } else {
            body["quality"] = json!("high");
        }

        let response = self
            .http
            .post(&self.openai_url)
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OpenAiResponse = response.json().await.map_err(decode_failed)?;
        let datum = parsed
            .data
            .first()
            .ok_or_else(|| CoreError::Upstream {
                status: status.as_u16(),
                message: "no image data in response".to_string(),
            })?;

        let bytes = if !datum.b64_json.is_empty() {
            BASE64
                .decode(&datum.b64_json)
                .map_err(|e| CoreError::Internal(format!("failed to decode base64 image: {e}")))?
        } else if !datum.url.is_empty() {
            self.download(&datum.url).await?
        } else {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: "no image data in response".to_string(),
            });
        };

        decode_image(&bytes)
    }

    async fn generate_gemini(
        &self,
        pool: &DbPool,
        prompt: &str,
        model: &str,
        portrait: bool,
        native_w: i64,
        native_h: i64,
    ) -> Result<DynamicImage, CoreError> {
        let api_key = require_key(pool, "google_api_key", "Google").await?;

        let mut image_config = json!({ "aspectRatio": gemini_aspect_ratio(portrait) });
        if let Some(size) = gemini_image_size(model, native_w, native_h) {
            image_config["imageSize"] = json!(size);
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["Image"],
                "imageConfig": image_config,
            },
        });

        let url = format!(
            "{}/models/{model}:generateContent?key={api_key}",
            self.gemini_base_url
        );
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response.json().await.map_err(decode_failed)?;
        let data = parsed
            .candidates
            .first()
            .map(|c| &c.content.parts)
            .and_then(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.inline_data.as_ref())
                    .find(|d| !d.data.is_empty())
            })
            .ok_or_else(|| CoreError::Upstream {
                status: status.as_u16(),
                message: "no image data in response".to_string(),
            })?;

        let bytes = BASE64
            .decode(&data.data)
            .map_err(|e| CoreError::Internal(format!("failed to decode base64 image: {e}")))?;
        decode_image(&bytes)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, CoreError> {
        let response = self.http.get(url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: format!("image download failed: {url}"),
            });
        }
        Ok(response
            .bytes()
            .await
            .map_err(decode_failed)?
            .to_vec())
    }
}

async fn require_key(pool: &DbPool, key: &str, provider: &str) -> Result<String, CoreError> {
    SettingRepo::get(pool, key)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?
        .filter(|k| !k.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{provider} API key not configured")))
}

fn request_failed(e: reqwest::Error) -> CoreError {
    CoreError::Upstream {
        status: 0,
        message: format!("provider request failed: {e}"),
    }
}

fn decode_failed(e: reqwest::Error) -> CoreError {
    CoreError::Upstream {
        status: 0,
        message: format!("failed to read provider response: {e}"),
    }
}

fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CoreError> {
    image::load_from_memory(bytes)
        .map_err(|e| CoreError::Internal(format!("failed to decode generated image: {e}")))
}
