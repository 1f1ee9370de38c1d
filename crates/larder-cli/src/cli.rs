//! Command definitions and handlers.
//!
//! Argument structs carry the clap derives; each converts into the core
//! types it feeds (`NewRecipe`, `RecipeFilter`) so the core crate stays free
//! of CLI concerns.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use larder_core::{
    GeminiClient, GeminiConfig, GenerationService, Larder, LarderError, NewRecipe,
    OperationStatus, PrepCeiling, Recipe, RecipeFilter, RecipeStore, Recipes, UnavailableService,
};
use log::debug;

use crate::renderer::TerminalRenderer;

// ============================================================================
// CLI Argument Wrappers
// ============================================================================

/// Search term and prep-time ceiling shared by list commands
#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Only show recipes whose name, description or ingredients contain this
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum prep time in minutes, or "all"
    #[arg(long, value_name = "MINUTES", default_value = "all")]
    pub max_prep: PrepCeiling,
}

impl From<FilterArgs> for RecipeFilter {
    fn from(val: FilterArgs) -> Self {
        RecipeFilter {
            search_term: val.search.unwrap_or_default(),
            prep_ceiling: val.max_prep,
        }
    }
}

/// Generate recipe ideas
///
/// Asks the generation service for recipes featuring the ingredient. Recipes
/// are printed as they are revealed; images are fetched in the background and
/// the final listing shows each image's state.
#[derive(Args)]
pub struct GenerateArgs {
    /// Main ingredient
    pub ingredient: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Save the recipes at these positions (1-based) of the final listing
    #[arg(long, value_delimiter = ',')]
    pub save: Vec<usize>,
}

/// Recipe identifier argument
#[derive(Args)]
pub struct IdArgs {
    /// Recipe ID as shown in listings
    pub id: String,
}

/// Add a recipe of your own
///
/// Ingredients and instructions take one entry per line; blank lines are
/// ignored.
#[derive(Args)]
pub struct AddRecipeArgs {
    /// Recipe name
    #[arg(long)]
    pub name: String,
    /// Short description
    #[arg(long, default_value = "")]
    pub description: String,
    /// Preparation time, e.g. "15 minutes"
    #[arg(long, default_value = "")]
    pub prep_time: String,
    /// Cooking time, e.g. "30 minutes"
    #[arg(long, default_value = "")]
    pub cook_time: String,
    /// Ingredients, one per line
    #[arg(long)]
    pub ingredients: String,
    /// Instructions, one step per line
    #[arg(long)]
    pub instructions: String,
}

impl TryFrom<AddRecipeArgs> for NewRecipe {
    type Error = LarderError;

    fn try_from(val: AddRecipeArgs) -> Result<Self, Self::Error> {
        NewRecipe::from_form(
            &val.name,
            &val.description,
            &val.prep_time,
            &val.cook_time,
            &val.ingredients,
            &val.instructions,
        )
    }
}

#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved recipes
    #[command(aliases = ["l", "ls"])]
    List(FilterArgs),
    /// Show a saved recipe
    Show(IdArgs),
    /// Remove a saved recipe
    #[command(aliases = ["rm"])]
    Remove(IdArgs),
}

#[derive(Subcommand)]
pub enum MineCommands {
    /// Add a recipe of your own
    #[command(alias = "a")]
    Add(AddRecipeArgs),
    /// List your recipes
    #[command(aliases = ["l", "ls"])]
    List(FilterArgs),
    /// Show one of your recipes
    Show(IdArgs),
    /// Remove one of your recipes
    #[command(aliases = ["rm"])]
    Remove(IdArgs),
}

// ============================================================================
// Handlers
// ============================================================================

/// Command handlers over an opened larder.
pub struct Cli {
    larder: Larder,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(larder: Larder, renderer: TerminalRenderer) -> Self {
        Self { larder, renderer }
    }

    fn status(&self, status: OperationStatus) -> Result<()> {
        self.renderer.render(&status.to_string())
    }

    /// Store that only reads and writes collections.
    fn offline_store(&self) -> Result<RecipeStore> {
        let service: Arc<dyn GenerationService> =
            Arc::new(UnavailableService::new("generation is not configured"));
        self.larder
            .recipe_store(service)
            .context("Sign in first with `larder login <email>`")
    }

    pub fn signup(&mut self, email: &str, password: &str) -> Result<()> {
        self.larder.session_mut().signup(email, password)?;
        self.status(OperationStatus::success(format!("Signed up as {}", email.trim())))
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.larder.session_mut().login(email, password)?;
        self.status(OperationStatus::success(format!("Signed in as {}", email.trim())))
    }

    pub fn logout(&mut self) -> Result<()> {
        self.larder.session_mut().logout()?;
        self.status(OperationStatus::success("Signed out"))
    }

    pub fn whoami(&self) -> Result<()> {
        match self.larder.session().current_user() {
            Some(user) => self.renderer.render(&format!("{user}\n")),
            None => self.renderer.render("Not signed in.\n"),
        }
    }

    pub async fn generate(&self, args: GenerateArgs) -> Result<()> {
        let ingredient = args.ingredient.trim();
        if ingredient.is_empty() {
            bail!("Please enter an ingredient");
        }

        let config = GeminiConfig::from_env()?;
        let service: Arc<dyn GenerationService> = Arc::new(GeminiClient::new(config));
        let store = self
            .larder
            .recipe_store(service)
            .context("Sign in first with `larder login <email>`")?;

        let mut revisions = store.subscribe();
        let handle = store.generate(ingredient);
        let mut shown = 0;

        loop {
            let revealed = tokio::select! {
                _ = handle.revealed() => true,
                changed = revisions.changed() => changed.is_err(),
            };

            let generated = store.generated();
            for recipe in generated.iter().skip(shown) {
                self.renderer.revealed(recipe)?;
            }
            shown = generated.len();

            if revealed {
                break;
            }
        }

        if let Some(error) = store.error() {
            bail!(error);
        }

        debug!("Waiting for images");
        handle.settled().await;

        store.set_search_term(args.filter.search.unwrap_or_default());
        store.set_prep_time_filter(args.filter.max_prep);
        let listed = store.filtered_generated();

        let mut output = format!("\n# Recipes with {ingredient}\n\n");
        if listed.is_empty() {
            output.push_str("No recipes found.\n");
        }
        for (position, recipe) in listed.iter().enumerate() {
            output.push_str(&format!(
                "{}. **{}** `{}` (prep {}, image: {})\n",
                position + 1,
                recipe.name,
                recipe.id,
                recipe.prep_time,
                self.renderer.image_label(&recipe.image)
            ));
        }
        self.renderer.render(&output)?;

        for position in args.save {
            let recipe = position
                .checked_sub(1)
                .and_then(|index| listed.get(index))
                .with_context(|| format!("No recipe at position {position}"))?;
            store.save_recipe(recipe.clone())?;
            self.status(OperationStatus::success(format!("Saved {}", recipe.name)))?;
        }

        Ok(())
    }

    pub fn handle_saved_command(&self, command: SavedCommands) -> Result<()> {
        let store = self.offline_store()?;
        match command {
            SavedCommands::List(filter) => {
                let recipes = RecipeFilter::from(filter).apply(&store.saved());
                self.render_list("Saved Recipes", recipes)
            }
            SavedCommands::Show(IdArgs { id }) => {
                let recipe = find_in(store.saved(), &id)?;
                self.renderer.render(&recipe.to_string())
            }
            SavedCommands::Remove(IdArgs { id }) => {
                let recipe = find_in(store.saved(), &id)?;
                store.remove_recipe(&id)?;
                self.status(OperationStatus::success(format!("Removed {}", recipe.name)))
            }
        }
    }

    pub fn handle_mine_command(&self, command: MineCommands) -> Result<()> {
        let store = self.offline_store()?;
        match command {
            MineCommands::Add(args) => {
                let recipe = store.add_my_recipe(NewRecipe::try_from(args)?)?;
                self.renderer.render(&recipe.to_string())
            }
            MineCommands::List(filter) => {
                let recipes = RecipeFilter::from(filter).apply(&store.my_recipes());
                self.render_list("My Recipes", recipes)
            }
            MineCommands::Show(IdArgs { id }) => {
                let recipe = find_in(store.my_recipes(), &id)?;
                self.renderer.render(&recipe.to_string())
            }
            MineCommands::Remove(IdArgs { id }) => {
                let recipe = find_in(store.my_recipes(), &id)?;
                store.remove_my_recipe(&id)?;
                self.status(OperationStatus::success(format!("Removed {}", recipe.name)))
            }
        }
    }

    fn render_list(&self, title: &str, recipes: Vec<Recipe>) -> Result<()> {
        self.renderer
            .render(&format!("# {title}\n\n{}", Recipes(recipes)))
    }
}

fn find_in(recipes: Vec<Recipe>, id: &str) -> Result<Recipe> {
    recipes
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| LarderError::RecipeNotFound { id: id.to_string() }.into())
}
