//! Recipe entity and generation drafts.

use serde::{Deserialize, Serialize};

use super::{requests::validate_fields, ImageStatus, NewRecipe};
use crate::error::Result;

/// A recipe record as returned by the generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

/// One dish idea held in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    /// Ingredient lines in list order
    pub ingredients: Vec<String>,
    /// Steps in cooking order
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub image: ImageStatus,
}

impl Recipe {
    /// Builds a generated recipe. The image starts out `Loading` when the
    /// draft carries a prompt and `Empty` otherwise.
    pub fn from_draft(draft: RecipeDraft, id: String) -> Self {
        let image = if draft.image_prompt.is_some() {
            ImageStatus::Loading
        } else {
            ImageStatus::Empty
        };

        Self {
            id,
            name: draft.name,
            description: draft.description,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            image_prompt: draft.image_prompt,
            image,
        }
    }

    /// Builds a hand-authored recipe. Authored recipes never carry an image.
    pub fn authored(recipe: NewRecipe, id: String) -> Self {
        Self {
            id,
            name: recipe.name,
            description: recipe.description,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            image_prompt: None,
            image: ImageStatus::Empty,
        }
    }

    /// Checks that the recipe can go into the saved or authored collection:
    /// a name plus at least one ingredient and one instruction.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, &self.ingredients, &self.instructions)
    }

    /// Text matched by the search filter: name, description and every
    /// ingredient line, space-joined in order.
    pub fn searchable_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.ingredients.len() + 2);
        parts.push(self.name.as_str());
        parts.push(self.description.as_str());
        parts.extend(self.ingredients.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// Builds a recipe id from its name, a millisecond timestamp and an optional
/// position within a generation batch.
///
/// Every whitespace character in the name becomes `-`.
///
/// # Examples
///
/// ```rust
/// use larder_core::models::recipe_id;
///
/// assert_eq!(recipe_id("Tofu Stir Fry", 1700, Some(2)), "Tofu-Stir-Fry-1700-2");
/// assert_eq!(recipe_id("Soup", 1700, None), "Soup-1700");
/// ```
pub fn recipe_id(name: &str, millis: i64, index: Option<usize>) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    match index {
        Some(index) => format!("{slug}-{millis}-{index}"),
        None => format!("{slug}-{millis}"),
    }
}
