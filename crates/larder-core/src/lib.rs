//! Core library for the Larder recipe-idea application.
//!
//! This crate provides the recipe store and everything it stands on:
//! key-value storage, persistent cells, the sign-in session, the filter engine
//! and the seam to the generative-AI service.
//!
//! # Architecture
//!
//! ```text
//! Session ──user id──▶ RecipeStore ──▶ GenerationService (Gemini)
//!    │                    │   │
//!    └── PersistentCell ◀─┘   └──▶ filter engine (views)
//!             │
//!        KeyValueStore (SQLite)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use larder_core::{GeminiClient, GeminiConfig, LarderBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut larder = LarderBuilder::new()
//!     .with_database_path(Some("larder.db"))
//!     .build()
//!     .await?;
//! larder.session_mut().login("cook@example.com", "secret")?;
//!
//! let service = Arc::new(GeminiClient::new(GeminiConfig::from_env()?));
//! let store = larder.recipe_store(service)?;
//!
//! store.generate("tofu").settled().await;
//! for recipe in store.generated() {
//!     println!("{}", recipe.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cell;
pub mod db;
pub mod display;
pub mod error;
pub mod filter;
pub mod gemini;
pub mod generation;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use builder::{Larder, LarderBuilder};
pub use cell::PersistentCell;
pub use display::{OperationStatus, Recipes};
pub use error::{LarderError, Result};
pub use filter::{filter_recipes, parse_prep_time, UNKNOWN_PREP_TIME};
pub use gemini::{GeminiClient, GeminiConfig};
pub use generation::{GenerationService, UnavailableService};
pub use models::{ImageStatus, NewRecipe, PrepCeiling, Recipe, RecipeDraft, RecipeFilter};
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::{GenerationHandle, RecipeStore, StoreOptions, StoreSnapshot};
