//! Display implementations for domain models.

use std::fmt;

use crate::models::{ImageStatus, Recipe};

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStatus::Ready { uri } => write!(f, "ready ({} bytes)", uri.len()),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl Recipe {
    /// One-line entry used in lists.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** `{}` (prep {}, cook {}, image: {})",
            self.name, self.id, self.prep_time, self.cook_time, self.image
        )
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Prep time: {}", self.prep_time)?;
        writeln!(f, "- Cook time: {}", self.cook_time)?;
        writeln!(f, "- Image: {}", self.image)?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        writeln!(f, "\n## Ingredients")?;
        writeln!(f)?;
        for line in &self.ingredients {
            writeln!(f, "- {line}")?;
        }

        writeln!(f, "\n## Instructions")?;
        writeln!(f)?;
        for (position, step) in self.instructions.iter().enumerate() {
            writeln!(f, "{}. {step}", position + 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: "Tofu-Curry-1-0".to_string(),
            name: "Tofu Curry".to_string(),
            description: "Creamy coconut curry".to_string(),
            prep_time: "15 minutes".to_string(),
            cook_time: "25 minutes".to_string(),
            ingredients: vec!["tofu".to_string(), "coconut milk".to_string()],
            instructions: vec!["Cube the tofu".to_string(), "Simmer".to_string()],
            image_prompt: Some("A bowl of curry".to_string()),
            image: ImageStatus::Ready {
                uri: "data:image/png;base64,AAAA".to_string(),
            },
        }
    }

    #[test]
    fn test_recipe_display_sections() {
        let output = sample().to_string();
        assert!(output.starts_with("# Tofu Curry\n"));
        assert!(output.contains("- ID: Tofu-Curry-1-0"));
        assert!(output.contains("## Ingredients\n\n- tofu\n- coconut milk\n"));
        assert!(output.contains("1. Cube the tofu\n2. Simmer\n"));
        assert!(output.contains("- Image: ready (26 bytes)"));
    }

    #[test]
    fn test_image_status_display() {
        assert_eq!(ImageStatus::Empty.to_string(), "none");
        assert_eq!(ImageStatus::Loading.to_string(), "loading");
        assert_eq!(ImageStatus::Error.to_string(), "error");
    }
}
