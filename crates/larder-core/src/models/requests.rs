//! Request types for authored recipes.

use serde::{Deserialize, Serialize};

use crate::error::{LarderError, Result};

/// A hand-authored recipe, validated and ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl NewRecipe {
    /// Builds a recipe from the authoring form's raw fields.
    ///
    /// `ingredients` and `instructions` hold one entry per line; blank lines
    /// are dropped and the remaining order is kept.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::InvalidInput` when the name is blank or when
    /// either list has no non-blank line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use larder_core::models::NewRecipe;
    ///
    /// let recipe = NewRecipe::from_form(
    ///     "Miso Soup",
    ///     "Warm and quick",
    ///     "5 minutes",
    ///     "10 minutes",
    ///     "dashi\n\nmiso paste\n",
    ///     "Heat dashi\nWhisk in miso",
    /// )?;
    /// assert_eq!(recipe.ingredients, vec!["dashi", "miso paste"]);
    ///
    /// assert!(NewRecipe::from_form("Soup", "", "", "", "  \n", "Stir").is_err());
    /// # Result::<(), larder_core::LarderError>::Ok(())
    /// ```
    pub fn from_form(
        name: &str,
        description: &str,
        prep_time: &str,
        cook_time: &str,
        ingredients: &str,
        instructions: &str,
    ) -> Result<Self> {
        let recipe = Self {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            prep_time: prep_time.trim().to_string(),
            cook_time: cook_time.trim().to_string(),
            ingredients: non_blank_lines(ingredients),
            instructions: non_blank_lines(instructions),
        };
        recipe.validate()?;
        Ok(recipe)
    }

    /// Checks the fields a stored recipe must always have.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, &self.ingredients, &self.instructions)
    }
}

/// Rejects a blank name or a list without a single non-blank line.
pub(crate) fn validate_fields(
    name: &str,
    ingredients: &[String],
    instructions: &[String],
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LarderError::invalid_input("name").with_reason("must not be blank"));
    }
    if ingredients.iter().all(|line| line.trim().is_empty()) {
        return Err(LarderError::invalid_input("ingredients")
            .with_reason("at least one ingredient is required"));
    }
    if instructions.iter().all(|line| line.trim().is_empty()) {
        return Err(LarderError::invalid_input("instructions")
            .with_reason("at least one instruction is required"));
    }
    Ok(())
}

fn non_blank_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
        .collect()
}
