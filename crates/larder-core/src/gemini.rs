//! Gemini API client implementing [`GenerationService`].
//!
//! Handles:
//! - Recipe list generation with a JSON response schema
//! - Image generation through the image modality

use std::env;

use async_trait::async_trait;
use log::{debug, error};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{HttpResultExt, LarderError, Result},
    generation::GenerationService,
    models::RecipeDraft,
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for recipe lists.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Model used for recipe images.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Number of recipes requested per ingredient.
pub const RECIPES_PER_REQUEST: usize = 4;

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl GeminiConfig {
    /// Creates a config with default endpoint and models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Loads the config from the environment.
    ///
    /// The key comes from `GEMINI_API_KEY`, falling back to `API_KEY`.
    /// `LARDER_GEMINI_BASE_URL`, `LARDER_TEXT_MODEL` and
    /// `LARDER_IMAGE_MODEL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LarderError::Configuration {
                message: "GEMINI_API_KEY (or API_KEY) environment variable not set".to_string(),
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("LARDER_GEMINI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = env::var("LARDER_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Ok(model) = env::var("LARDER_IMAGE_MODEL") {
            config.image_model = model;
        }
        Ok(config)
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client from its config.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }

    /// POST a generateContent request and decode the response envelope.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::Http` when the request cannot be sent, the API
    /// answers with a non-success status, or the body is not a response
    /// envelope.
    async fn generate_content(&self, model: &str, body: Value) -> Result<GenerateContentResponse> {
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .http_context("Request to the Gemini API failed")?;

        let status = response.status();
        if let Some(source) = response.error_for_status_ref().err() {
            let text = response.text().await.unwrap_or_default();
            return Err(LarderError::Http {
                message: format!("Gemini API returned {status}: {}", text.trim()),
                source,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .http_context("Gemini API returned an unreadable response body")
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn list_recipes(&self, ingredient: &str) -> Result<Vec<RecipeDraft>> {
        let body = recipe_request_body(ingredient);
        debug!("Requesting recipes for '{ingredient}' from {}", self.config.text_model);

        let response = self.generate_content(&self.config.text_model, body).await?;

        parse_recipe_response(&response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] },
        });

        let response = self.generate_content(&self.config.image_model, body).await?;

        image_data_uri(&response)
            .ok_or_else(|| LarderError::image("No image data found in response"))
    }
}

/// Request body asking for a JSON array of recipes.
fn recipe_request_body(ingredient: &str) -> Value {
    let prompt = format!(
        "Generate {RECIPES_PER_REQUEST} diverse and delicious recipes that feature {ingredient} \
         as a main ingredient. For each recipe, also create a detailed prompt for an image \
         generation model. Provide the output in a clean JSON array format."
    );

    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": { "type": "ARRAY", "items": recipe_schema() },
        },
    })
}

fn recipe_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "The name of the recipe." },
            "description": {
                "type": "STRING",
                "description": "A brief, enticing description of the dish."
            },
            "prepTime": {
                "type": "STRING",
                "description": "Preparation time, e.g., \"15 minutes\"."
            },
            "cookTime": {
                "type": "STRING",
                "description": "Cooking time, e.g., \"30 minutes\"."
            },
            "ingredients": {
                "type": "ARRAY",
                "description": "A list of ingredients with quantities.",
                "items": { "type": "STRING" }
            },
            "instructions": {
                "type": "ARRAY",
                "description": "Step-by-step cooking instructions.",
                "items": { "type": "STRING" }
            },
            "imagePrompt": {
                "type": "STRING",
                "description": "A detailed, creative, and photorealistic image prompt for a food \
                                photography shot of this dish. This should include descriptions \
                                of the lighting, plating, and background."
            }
        },
        "required": [
            "name", "description", "prepTime", "cookTime",
            "ingredients", "instructions", "imagePrompt"
        ],
    })
}

/// Extracts the recipe array from the first candidate's text parts.
fn parse_recipe_response(response: &GenerateContentResponse) -> Result<Vec<RecipeDraft>> {
    let text: String = response
        .parts()
        .filter_map(|part| part.text.as_deref())
        .collect();

    let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
        error!("Recipe response is not JSON: {e}");
        LarderError::generation("Could not fetch recipes from the Gemini API.")
    })?;

    if !value.is_array() {
        return Err(LarderError::generation(
            "API did not return an array of recipes.",
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        error!("Recipe response has an unexpected shape: {e}");
        LarderError::generation("Could not fetch recipes from the Gemini API.")
    })
}

/// First inline image part as a `data:` URI.
fn image_data_uri(response: &GenerateContentResponse) -> Option<String> {
    response.parts().find_map(|part| {
        part.inline_data.as_ref().map(|data| {
            let mime = data.mime_type.as_deref().unwrap_or("image/png");
            format!("data:{mime};base64,{}", data.data)
        })
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}
