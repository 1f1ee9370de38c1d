//! Markdown formatting for recipes and recipe collections.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation results are formatted through small newtype
//! wrappers so the same data can be shown as a compact list or in full.
//!
//! - [`collections`]: [`Recipes`] list wrapper
//! - [`status`]: [`OperationStatus`] confirmation messages
//!
//! ```rust
//! use larder_core::{display::Recipes, models::{ImageStatus, Recipe}};
//!
//! let recipe = Recipe {
//!     id: "Soup-1".to_string(),
//!     name: "Soup".to_string(),
//!     description: "Hot".to_string(),
//!     prep_time: "5 minutes".to_string(),
//!     cook_time: "20 minutes".to_string(),
//!     ingredients: vec!["water".to_string()],
//!     instructions: vec!["Boil".to_string()],
//!     image_prompt: None,
//!     image: ImageStatus::Empty,
//! };
//! let output = Recipes(vec![recipe]).to_string();
//! assert!(output.contains("Soup"));
//! ```

pub mod collections;
pub mod models;
pub mod status;

pub use collections::Recipes;
pub use status::OperationStatus;
