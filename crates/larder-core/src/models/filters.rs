//! Filter parameters for recipe views.

use std::{fmt, str::FromStr};

use crate::filter::filter_recipes;

use super::Recipe;

/// Maximum allowed preparation time for a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrepCeiling {
    /// No ceiling; every recipe passes
    #[default]
    All,

    /// Recipes taking more than this many minutes are filtered out
    Minutes(u64),
}

impl FromStr for PrepCeiling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PrepCeiling::All);
        }
        s.parse::<u64>()
            .map(PrepCeiling::Minutes)
            .map_err(|_| format!("Invalid prep time filter: {s} (expected 'all' or minutes)"))
    }
}

impl fmt::Display for PrepCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepCeiling::All => write!(f, "all"),
            PrepCeiling::Minutes(minutes) => write!(f, "{minutes}"),
        }
    }
}

/// Search term and prep-time ceiling applied to every recipe view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Case-insensitive substring matched against name, description and
    /// ingredients
    pub search_term: String,

    /// Maximum prep time
    pub prep_ceiling: PrepCeiling,
}

impl RecipeFilter {
    /// Whether the filter lets every recipe through.
    pub fn is_unconstrained(&self) -> bool {
        self.search_term.is_empty() && self.prep_ceiling == PrepCeiling::All
    }

    /// Applies the filter to a collection, keeping order.
    pub fn apply(&self, recipes: &[Recipe]) -> Vec<Recipe> {
        filter_recipes(recipes, &self.search_term, self.prep_ceiling)
    }
}
