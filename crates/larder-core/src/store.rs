//! Recipe store: collections, the generation workflow and filtered views.
//!
//! A [`RecipeStore`] belongs to one signed-in user. It owns three
//! collections:
//!
//! - **generated**: the latest batch from [`RecipeStore::generate`], kept in
//!   memory only
//! - **saved**: bookmarked recipes, persisted under `savedRecipes_{user}`
//! - **my recipes**: hand-authored recipes, persisted under
//!   `myRecipes_{user}`
//!
//! # Generation workflow
//!
//! ```text
//! generate(ingredient)
//!   ├─ clear generated + filter, set busy
//!   └─ spawn ─▶ list_recipes ─▶ for each draft:
//!                                 wait reveal_delay (cancellable)
//!                                 append as Loading / Empty
//!                                 spawn ─▶ generate_image ─▶ patch by id
//!               clear busy
//! ```
//!
//! Each call to `generate` starts a new batch and cancels the reveal
//! sequence of the previous one. Image results are applied only to entries of
//! the current batch that are still `Loading`; anything else is dropped.
//!
//! The handle is cheap to clone and every clone sees the same state. State
//! lives behind one mutex that is never held across an await, so each
//! mutation is a whole read-compute-write step.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use jiff::Timestamp;
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    cell::PersistentCell,
    error::{LarderError, Result},
    generation::GenerationService,
    models::{recipe_id, ImageStatus, NewRecipe, PrepCeiling, Recipe, RecipeFilter},
    session::Session,
    storage::KeyValueStore,
};

/// Pause before each generated recipe is revealed.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(300);

/// Message recorded when the recipe list call fails.
pub const GENERATION_ERROR_MESSAGE: &str = "Failed to generate recipes. Please try again.";

/// Storage key of a user's saved collection.
pub fn saved_recipes_key(user_id: &str) -> String {
    format!("savedRecipes_{user_id}")
}

/// Storage key of a user's authored collection.
pub fn my_recipes_key(user_id: &str) -> String {
    format!("myRecipes_{user_id}")
}

/// Tunables for a [`RecipeStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Pause before each generated recipe is appended. Zero disables pacing.
    pub reveal_delay: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

impl StoreOptions {
    /// Sets the reveal delay.
    pub fn with_reveal_delay(mut self, reveal_delay: Duration) -> Self {
        self.reveal_delay = reveal_delay;
        self
    }
}

/// Point-in-time copy of everything a view needs.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub generated: Vec<Recipe>,
    pub saved: Vec<Recipe>,
    pub my_recipes: Vec<Recipe>,
    pub filtered_generated: Vec<Recipe>,
    pub filtered_saved: Vec<Recipe>,
    pub filtered_my_recipes: Vec<Recipe>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub filter: RecipeFilter,
}

struct StoreState {
    generated: Vec<Recipe>,
    saved: PersistentCell<Vec<Recipe>>,
    my_recipes: PersistentCell<Vec<Recipe>>,
    is_loading: bool,
    error: Option<String>,
    filter: RecipeFilter,
    /// Number of the current generation batch; 0 before the first one.
    batch: u64,
    reveal_cancel: Option<CancellationToken>,
}

impl StoreState {
    fn is_current(&self, batch: u64) -> bool {
        self.batch == batch
    }

    /// Resolves a pending image of the current batch. Returns whether an
    /// entry changed.
    fn patch_image(&mut self, batch: u64, id: &str, status: &ImageStatus) -> bool {
        if !self.is_current(batch) {
            return false;
        }

        match self.generated.iter_mut().find(|r| r.id == id) {
            Some(recipe) if recipe.image.is_loading() => {
                recipe.image = status.clone();
                true
            }
            _ => false,
        }
    }

    /// A recipe saved while its image was pending gets the result too.
    fn patch_saved_image(&mut self, id: &str, status: &ImageStatus) -> Result<()> {
        let pending = self
            .saved
            .get()
            .iter()
            .any(|r| r.id == id && r.image.is_loading());
        if !pending {
            return Ok(());
        }

        self.saved.update(|saved| {
            saved
                .iter()
                .cloned()
                .map(|mut r| {
                    if r.id == id {
                        r.image = status.clone();
                    }
                    r
                })
                .collect()
        })
    }
}

struct Shared {
    user_id: String,
    service: Arc<dyn GenerationService>,
    options: StoreOptions,
    state: Mutex<StoreState>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under the state lock, then notifies subscribers.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = {
            let mut state = self.state();
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }
}

/// Per-user recipe collections and the generation workflow.
#[derive(Clone)]
pub struct RecipeStore {
    shared: Arc<Shared>,
}

impl RecipeStore {
    /// Opens the store for `user_id`, loading the persisted collections from
    /// `storage`.
    pub fn open(
        user_id: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        service: Arc<dyn GenerationService>,
        options: StoreOptions,
    ) -> Self {
        let user_id = user_id.into();
        let mut saved =
            PersistentCell::load(storage.clone(), saved_recipes_key(&user_id), Vec::new());
        settle_interrupted_images(&mut saved);
        let my_recipes = PersistentCell::load(storage, my_recipes_key(&user_id), Vec::new());

        debug!(
            "Opened recipe store for {user_id}: {} saved, {} authored",
            saved.get().len(),
            my_recipes.get().len()
        );

        let state = StoreState {
            generated: Vec::new(),
            saved,
            my_recipes,
            is_loading: false,
            error: None,
            filter: RecipeFilter::default(),
            batch: 0,
            reveal_cancel: None,
        };
        let (revision, _) = watch::channel(0);

        Self {
            shared: Arc::new(Shared {
                user_id,
                service,
                options,
                state: Mutex::new(state),
                revision,
            }),
        }
    }

    /// Opens the store for the session's signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::Auth` when nobody is signed in.
    pub fn for_session(
        session: &Session,
        service: Arc<dyn GenerationService>,
        options: StoreOptions,
    ) -> Result<Self> {
        let user_id = session
            .current_user()
            .ok_or_else(|| LarderError::Auth("Not signed in.".to_string()))?;
        Ok(Self::open(user_id, session.storage(), service, options))
    }

    /// Identifier of the user owning this store.
    pub fn user_id(&self) -> &str {
        &self.shared.user_id
    }

    /// Starts a generation batch for `ingredient` and returns immediately.
    ///
    /// The generated collection, search term and prep-time filter are reset
    /// right away and the busy flag is set. The rest runs on a spawned task;
    /// use the returned handle to wait for it or to stop the reveal sequence.
    /// The caller is responsible for passing a non-blank ingredient.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn generate(&self, ingredient: &str) -> GenerationHandle {
        let cancel = CancellationToken::new();
        let revealed = CancellationToken::new();
        let tracker = TaskTracker::new();

        let batch = self.shared.mutate(|state| {
            if let Some(previous) = state.reveal_cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            state.batch += 1;
            state.generated.clear();
            state.filter = RecipeFilter::default();
            state.error = None;
            state.is_loading = true;
            state.batch
        });

        info!("Generating recipes for '{ingredient}' (batch {batch})");

        tracker.spawn(run_batch(
            self.shared.clone(),
            batch,
            ingredient.to_string(),
            cancel.clone(),
            revealed.clone(),
            tracker.clone(),
        ));
        tracker.close();

        GenerationHandle {
            batch,
            cancel,
            revealed,
            tracker,
        }
    }

    /// Bookmarks a recipe. Saving an id that is already saved does nothing.
    ///
    /// # Errors
    ///
    /// * `LarderError::InvalidInput` - When the recipe has no ingredients or
    ///   no instructions
    /// * Storage errors when persisting fails
    pub fn save_recipe(&self, recipe: Recipe) -> Result<()> {
        recipe.validate()?;

        self.shared.mutate(|state| {
            if state.saved.get().iter().any(|r| r.id == recipe.id) {
                return Ok(());
            }
            debug!("Saving recipe {}", recipe.id);
            state.saved.update(|saved| {
                let mut next = saved.clone();
                next.push(recipe);
                next
            })
        })
    }

    /// Removes a saved recipe. Unknown ids are ignored.
    pub fn remove_recipe(&self, id: &str) -> Result<()> {
        self.shared.mutate(|state| remove_by_id(&mut state.saved, id))
    }

    /// Adds a hand-authored recipe and returns it with its new id.
    ///
    /// # Errors
    ///
    /// * `LarderError::InvalidInput` - When the recipe fails validation
    /// * Storage errors when persisting fails
    pub fn add_my_recipe(&self, recipe: NewRecipe) -> Result<Recipe> {
        recipe.validate()?;

        self.shared.mutate(|state| {
            let millis = Timestamp::now().as_millisecond();
            let mut id = recipe_id(&recipe.name, millis, None);
            let mut suffix = 1;
            while state.my_recipes.get().iter().any(|r| r.id == id) {
                id = recipe_id(&recipe.name, millis, Some(suffix));
                suffix += 1;
            }

            let recipe = Recipe::authored(recipe, id);
            state.my_recipes.update(|mine| {
                let mut next = mine.clone();
                next.push(recipe.clone());
                next
            })?;
            debug!("Added authored recipe {}", recipe.id);
            Ok(recipe)
        })
    }

    /// Removes an authored recipe. Unknown ids are ignored.
    pub fn remove_my_recipe(&self, id: &str) -> Result<()> {
        self.shared.mutate(|state| remove_by_id(&mut state.my_recipes, id))
    }

    /// Whether `id` is in the saved collection.
    pub fn is_recipe_saved(&self, id: &str) -> bool {
        self.shared.state().saved.get().iter().any(|r| r.id == id)
    }

    /// Sets the search term used by every filtered view.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.shared.mutate(|state| state.filter.search_term = term);
    }

    /// Sets the prep-time ceiling used by every filtered view.
    pub fn set_prep_time_filter(&self, ceiling: PrepCeiling) {
        self.shared.mutate(|state| state.filter.prep_ceiling = ceiling);
    }

    /// Current filter parameters.
    pub fn filter(&self) -> RecipeFilter {
        self.shared.state().filter.clone()
    }

    /// The latest generated batch, unfiltered.
    pub fn generated(&self) -> Vec<Recipe> {
        self.shared.state().generated.clone()
    }

    /// Saved recipes, unfiltered.
    pub fn saved(&self) -> Vec<Recipe> {
        self.shared.state().saved.get().clone()
    }

    /// Authored recipes, unfiltered.
    pub fn my_recipes(&self) -> Vec<Recipe> {
        self.shared.state().my_recipes.get().clone()
    }

    /// The latest generated batch with the current filter applied.
    pub fn filtered_generated(&self) -> Vec<Recipe> {
        let state = self.shared.state();
        state.filter.apply(&state.generated)
    }

    /// Saved recipes with the current filter applied.
    pub fn filtered_saved(&self) -> Vec<Recipe> {
        let state = self.shared.state();
        state.filter.apply(state.saved.get())
    }

    /// Authored recipes with the current filter applied.
    pub fn filtered_my_recipes(&self) -> Vec<Recipe> {
        let state = self.shared.state();
        state.filter.apply(state.my_recipes.get())
    }

    /// Finds a recipe by id in the saved, authored or generated collection,
    /// in that order.
    pub fn find(&self, id: &str) -> Option<Recipe> {
        let state = self.shared.state();
        state
            .saved
            .get()
            .iter()
            .chain(state.my_recipes.get().iter())
            .chain(state.generated.iter())
            .find(|r| r.id == id)
            .cloned()
    }

    /// Whether a generation batch is still revealing recipes.
    pub fn is_loading(&self) -> bool {
        self.shared.state().is_loading
    }

    /// Message of the last failed generation, cleared by the next one.
    pub fn error(&self) -> Option<String> {
        self.shared.state().error.clone()
    }

    /// Copies every collection and view in one consistent read.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.shared.state();
        StoreSnapshot {
            generated: state.generated.clone(),
            saved: state.saved.get().clone(),
            my_recipes: state.my_recipes.get().clone(),
            filtered_generated: state.filter.apply(&state.generated),
            filtered_saved: state.filter.apply(state.saved.get()),
            filtered_my_recipes: state.filter.apply(state.my_recipes.get()),
            is_loading: state.is_loading,
            error: state.error.clone(),
            filter: state.filter.clone(),
        }
    }

    /// Receiver whose value changes after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }
}

/// Saved images still `Loading` at open time were pending in a process that
/// has since exited. No request will resolve them, so they become `Empty`.
fn settle_interrupted_images(cell: &mut PersistentCell<Vec<Recipe>>) {
    if !cell.get().iter().any(|r| r.image.is_loading()) {
        return;
    }

    let result = cell.update(|recipes| {
        recipes
            .iter()
            .cloned()
            .map(|mut r| {
                if r.image.is_loading() {
                    r.image = ImageStatus::Empty;
                }
                r
            })
            .collect()
    });
    if let Err(e) = result {
        warn!("Failed to reset pending images in {}: {e}", cell.key());
    }
}

fn remove_by_id(cell: &mut PersistentCell<Vec<Recipe>>, id: &str) -> Result<()> {
    if !cell.get().iter().any(|r| r.id == id) {
        return Ok(());
    }
    debug!("Removing recipe {id} from {}", cell.key());
    cell.update(|recipes| recipes.iter().filter(|r| r.id != id).cloned().collect())
}

/// Handle to one generation batch.
#[derive(Debug, Clone)]
pub struct GenerationHandle {
    batch: u64,
    cancel: CancellationToken,
    revealed: CancellationToken,
    tracker: TaskTracker,
}

impl GenerationHandle {
    /// Batch number, increasing with every call to `generate`.
    pub fn batch(&self) -> u64 {
        self.batch
    }

    /// Stops revealing further recipes. Image requests already issued still
    /// complete.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits until the batch has stopped appending recipes: every draft was
    /// revealed, the list call failed, or the batch was cancelled.
    pub async fn revealed(&self) {
        self.revealed.cancelled().await;
    }

    /// Waits until the batch has stopped appending and every image request it
    /// issued has resolved.
    pub async fn settled(&self) {
        self.tracker.wait().await;
    }
}

async fn run_batch(
    shared: Arc<Shared>,
    batch: u64,
    ingredient: String,
    cancel: CancellationToken,
    revealed: CancellationToken,
    tracker: TaskTracker,
) {
    let _revealed = revealed.drop_guard();

    let listed = tokio::select! {
        _ = cancel.cancelled() => None,
        result = shared.service.list_recipes(&ingredient) => Some(result),
    };

    let drafts = match listed {
        None => {
            finish_batch(&shared, batch);
            return;
        }
        Some(Ok(drafts)) => drafts,
        Some(Err(e)) => {
            error!("Recipe generation for '{ingredient}' failed: {e}");
            shared.mutate(|state| {
                if state.is_current(batch) {
                    state.generated.clear();
                    state.error = Some(GENERATION_ERROR_MESSAGE.to_string());
                    state.is_loading = false;
                }
            });
            return;
        }
    };

    debug!("Batch {batch} received {} drafts", drafts.len());

    for (index, draft) in drafts.into_iter().enumerate() {
        let delay = shared.options.reveal_delay;
        if !delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            break;
        }

        let id = recipe_id(&draft.name, Timestamp::now().as_millisecond(), Some(index));
        let recipe = Recipe::from_draft(draft, id);
        let prompt = recipe.image_prompt.clone();
        let entry_id = recipe.id.clone();

        let appended = shared.mutate(|state| {
            if !state.is_current(batch) {
                return false;
            }
            state.generated.push(recipe);
            true
        });
        if !appended {
            break;
        }

        if let Some(prompt) = prompt {
            tracker.spawn(fetch_image(shared.clone(), batch, entry_id, prompt));
        }
    }

    finish_batch(&shared, batch);
}

fn finish_batch(shared: &Shared, batch: u64) {
    shared.mutate(|state| {
        if state.is_current(batch) {
            state.is_loading = false;
        }
    });
}

async fn fetch_image(shared: Arc<Shared>, batch: u64, id: String, prompt: String) {
    let status = match shared.service.generate_image(&prompt).await {
        Ok(uri) => ImageStatus::Ready { uri },
        Err(e) => {
            warn!("Failed to generate image for {id}: {e}");
            ImageStatus::Error
        }
    };

    shared.mutate(|state| {
        if !state.patch_image(batch, &id, &status) {
            debug!("Dropping image result for {id}; entry is gone or already resolved");
        }
        if let Err(e) = state.patch_saved_image(&id, &status) {
            warn!("Failed to persist image for saved recipe {id}: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{models::RecipeDraft, storage::MemoryStore};

    struct FixedService {
        drafts: Vec<RecipeDraft>,
    }

    #[async_trait]
    impl GenerationService for FixedService {
        async fn list_recipes(&self, _ingredient: &str) -> Result<Vec<RecipeDraft>> {
            Ok(self.drafts.clone())
        }

        async fn generate_image(&self, prompt: &str) -> Result<String> {
            Ok(format!("data:image/png;base64,{prompt}"))
        }
    }

    fn draft(name: &str, prompt: Option<&str>) -> RecipeDraft {
        RecipeDraft {
            name: name.to_string(),
            description: "desc".to_string(),
            prep_time: "10 minutes".to_string(),
            cook_time: "10 minutes".to_string(),
            ingredients: vec!["salt".to_string()],
            instructions: vec!["Cook".to_string()],
            image_prompt: prompt.map(String::from),
        }
    }

    fn store_with(drafts: Vec<RecipeDraft>) -> RecipeStore {
        RecipeStore::open(
            "cook@example.com",
            Arc::new(MemoryStore::new()),
            Arc::new(FixedService { drafts }),
            StoreOptions::default().with_reveal_delay(Duration::ZERO),
        )
    }

    #[test]
    fn test_storage_keys_are_namespaced_by_user() {
        assert_eq!(saved_recipes_key("a@b.c"), "savedRecipes_a@b.c");
        assert_eq!(my_recipes_key("a@b.c"), "myRecipes_a@b.c");
    }

    #[test]
    fn test_patch_image_only_resolves_loading_entries_once() {
        let store = store_with(vec![]);
        let mut state = store.shared.state();
        state.batch = 3;
        state.generated.push(Recipe::from_draft(draft("A", Some("p")), "a".to_string()));

        let ready = ImageStatus::Ready { uri: "u".into() };
        assert!(!state.patch_image(2, "a", &ready));
        assert!(state.patch_image(3, "a", &ready));
        assert!(!state.patch_image(3, "a", &ImageStatus::Error));
        assert!(!state.patch_image(3, "missing", &ready));
        assert_eq!(state.generated[0].image, ready);
    }

    #[tokio::test]
    async fn test_generate_resets_filter_and_sets_busy() {
        let store = store_with(vec![draft("Soup", None)]);
        store.set_search_term("soup");
        store.set_prep_time_filter(PrepCeiling::Minutes(5));

        let handle = store.generate("leek");
        assert!(store.is_loading());
        assert!(store.filter().is_unconstrained());
        assert!(store.generated().is_empty());

        handle.settled().await;
        assert!(!store.is_loading());
        assert_eq!(store.generated().len(), 1);
        assert_eq!(store.generated()[0].image, ImageStatus::Empty);
    }

    #[tokio::test]
    async fn test_subscribe_observes_mutations() {
        let store = store_with(vec![]);
        let mut rx = store.subscribe();
        let before = *rx.borrow_and_update();

        store.set_search_term("x");
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update() > before);
    }
}
