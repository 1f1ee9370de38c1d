//! Filter engine for recipe collections.
//!
//! Both functions are pure; the store calls them whenever a view is read so
//! views always reflect the current collections and filter parameters.

use crate::models::{PrepCeiling, Recipe};

/// Prep time assigned to empty or unparseable strings. Fails every finite
/// ceiling and passes [`PrepCeiling::All`].
pub const UNKNOWN_PREP_TIME: u64 = u64::MAX;

/// Parses a free-text duration such as `"15 minutes"` or `"1 hour"` into
/// minutes.
///
/// The leading integer is taken as the amount; when the text mentions "hour"
/// the amount is multiplied by 60.
///
/// # Examples
///
/// ```rust
/// use larder_core::filter::{parse_prep_time, UNKNOWN_PREP_TIME};
///
/// assert_eq!(parse_prep_time("15 minutes"), 15);
/// assert_eq!(parse_prep_time("2 hours"), 120);
/// assert_eq!(parse_prep_time(""), UNKNOWN_PREP_TIME);
/// ```
pub fn parse_prep_time(text: &str) -> u64 {
    let text = text.trim_start().to_lowercase();
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();

    let Ok(amount) = digits.parse::<u64>() else {
        return UNKNOWN_PREP_TIME;
    };

    if text.contains("hour") {
        amount.saturating_mul(60)
    } else {
        amount
    }
}

/// Returns the recipes that pass both the prep-time ceiling and the search
/// term, in their original order.
///
/// An empty search term matches everything; otherwise the lowercased term
/// must occur in the lowercased [`Recipe::searchable_text`].
pub fn filter_recipes(recipes: &[Recipe], search_term: &str, ceiling: PrepCeiling) -> Vec<Recipe> {
    let term = search_term.to_lowercase();

    recipes
        .iter()
        .filter(|recipe| within_ceiling(recipe, ceiling))
        .filter(|recipe| term.is_empty() || recipe.searchable_text().to_lowercase().contains(&term))
        .cloned()
        .collect()
}

fn within_ceiling(recipe: &Recipe, ceiling: PrepCeiling) -> bool {
    match ceiling {
        PrepCeiling::All => true,
        PrepCeiling::Minutes(max) => parse_prep_time(&recipe.prep_time) <= max,
    }
}
