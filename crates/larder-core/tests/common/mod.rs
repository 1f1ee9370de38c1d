#![allow(dead_code)]

pub mod http;

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use larder_core::{
    GenerationService, LarderError, MemoryStore, RecipeDraft, RecipeStore, Result, StoreOptions,
};
use tokio::sync::Semaphore;

/// Generation service stub with per-ingredient drafts.
///
/// Image requests return `data:image/png;base64,{prompt}` unless the prompt is
/// listed in `failing_prompts`. When a gate is set, every image request first
/// waits for one permit.
#[derive(Default)]
pub struct StubService {
    pub drafts: HashMap<String, Vec<RecipeDraft>>,
    pub failing_prompts: HashSet<String>,
    pub gate: Option<Arc<Semaphore>>,
    pub list_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
}

impl StubService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drafts(mut self, ingredient: &str, drafts: Vec<RecipeDraft>) -> Self {
        self.drafts.insert(ingredient.to_string(), drafts);
        self
    }

    pub fn failing_image(mut self, prompt: &str) -> Self {
        self.failing_prompts.insert(prompt.to_string());
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl GenerationService for StubService {
    async fn list_recipes(&self, ingredient: &str) -> Result<Vec<RecipeDraft>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.drafts
            .get(ingredient)
            .cloned()
            .ok_or_else(|| LarderError::generation("Could not fetch recipes"))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| LarderError::image("gate closed"))?;
            permit.forget();
        }
        if self.failing_prompts.contains(prompt) {
            return Err(LarderError::image("No image data found in response"));
        }
        Ok(format!("data:image/png;base64,{prompt}"))
    }
}

pub fn draft(name: &str, prep_time: &str, image_prompt: Option<&str>) -> RecipeDraft {
    RecipeDraft {
        name: name.to_string(),
        description: format!("{name}, freshly imagined"),
        prep_time: prep_time.to_string(),
        cook_time: "20 minutes".to_string(),
        ingredients: vec!["salt".to_string(), "pepper".to_string()],
        instructions: vec!["Prepare".to_string(), "Serve".to_string()],
        image_prompt: image_prompt.map(String::from),
    }
}

pub fn fast_options() -> StoreOptions {
    StoreOptions::default().with_reveal_delay(Duration::ZERO)
}

/// Store for a fixed user over fresh in-memory storage.
pub fn create_test_store(service: StubService) -> (Arc<StubService>, RecipeStore) {
    let service = Arc::new(service);
    let store = RecipeStore::open(
        "cook@example.com",
        Arc::new(MemoryStore::new()),
        service.clone(),
        fast_options(),
    );
    (service, store)
}
