//! Data models for recipes and recipe collections.
//!
//! This module contains the domain types shared by the store, the filter
//! engine and the generation service. Display implementations live in
//! [`crate::display`] so the models stay free of presentation logic.
//!
//! # Lifecycle
//!
//! - [`RecipeDraft`]: what the generation service returns, before an id or
//!   image state is assigned.
//! - [`NewRecipe`]: a validated, hand-authored recipe from the form.
//! - [`Recipe`]: a stored entity with an id and an [`ImageStatus`].
//!
//! # Examples
//!
//! ```rust
//! use larder_core::models::{ImageStatus, Recipe, RecipeDraft};
//!
//! let draft = RecipeDraft {
//!     name: "Crispy Tofu".to_string(),
//!     description: "Golden cubes".to_string(),
//!     prep_time: "10 minutes".to_string(),
//!     cook_time: "20 minutes".to_string(),
//!     ingredients: vec!["1 block tofu".to_string()],
//!     instructions: vec!["Press the tofu".to_string()],
//!     image_prompt: Some("Overhead shot of crispy tofu".to_string()),
//! };
//! let recipe = Recipe::from_draft(draft, "Crispy-Tofu-1-0".to_string());
//! assert_eq!(recipe.image, ImageStatus::Loading);
//! ```

pub mod filters;
pub mod image;
pub mod recipe;
pub mod requests;


pub use filters::{PrepCeiling, RecipeFilter};
pub use image::ImageStatus;
pub use recipe::{recipe_id, Recipe, RecipeDraft};
pub use requests::NewRecipe;
