//! Seam to the generative-AI service.
//!
//! The store only needs two calls: a recipe list for an ingredient, and an
//! image for a prompt. [`crate::gemini::GeminiClient`] is the production
//! implementation; tests plug in stubs.

use async_trait::async_trait;

use crate::{
    error::{LarderError, Result},
    models::RecipeDraft,
};

/// Generative service consumed by [`crate::store::RecipeStore`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produces recipe drafts featuring `ingredient`.
    ///
    /// Fails with `LarderError::Generation` when the answer is not a usable
    /// recipe list. Implementations backed by a network service may also
    /// return `LarderError::Http`.
    async fn list_recipes(&self, ingredient: &str) -> Result<Vec<RecipeDraft>>;

    /// Produces an image reference (a `data:` URI) for `prompt`.
    ///
    /// Fails with `LarderError::Image` when no image payload comes back, or
    /// `LarderError::Http` for transport failures.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// Service that rejects every call, for stores that never generate.
#[derive(Debug, Clone)]
pub struct UnavailableService {
    reason: String,
}

impl UnavailableService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerationService for UnavailableService {
    async fn list_recipes(&self, _ingredient: &str) -> Result<Vec<RecipeDraft>> {
        Err(LarderError::generation(self.reason.clone()))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String> {
        Err(LarderError::image(self.reason.clone()))
    }
}
