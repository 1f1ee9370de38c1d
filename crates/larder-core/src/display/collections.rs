//! Collection wrapper types for displaying groups of recipes.

use std::fmt;

use crate::models::Recipe;

/// Newtype wrapper for displaying a recipe list.
///
/// Each recipe is rendered as one summary line. Empty collections render a
/// placeholder line.
pub struct Recipes(pub Vec<Recipe>);

impl fmt::Display for Recipes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No recipes found.");
        }
        for recipe in &self.0 {
            recipe.fmt_summary(f)?;
        }
        Ok(())
    }
}
