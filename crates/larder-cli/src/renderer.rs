//! Terminal output for recipe listings and generation progress.
//!
//! Rich mode renders markdown through termimad and colours image states.
//! Plain mode (`--no-color`) prints the markdown source unchanged.

use anyhow::Result;
use larder_core::{ImageStatus, Recipe};
use termimad::{crossterm::style::Color, MadSkin};

/// Prints markdown either styled or as plain text.
pub struct TerminalRenderer {
    skin: Option<MadSkin>,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        Self {
            skin: rich_enabled.then(recipe_skin),
        }
    }

    /// Print a markdown document.
    pub fn render(&self, markdown: &str) -> Result<()> {
        match &self.skin {
            Some(skin) => skin.print_text(markdown),
            None => print!("{markdown}"),
        }
        Ok(())
    }

    /// Print the progress line for a recipe appended during generation.
    pub fn revealed(&self, recipe: &Recipe) -> Result<()> {
        let line = self.revealed_line(recipe);
        match &self.skin {
            Some(skin) => {
                skin.print_inline(&line);
                println!();
            }
            None => println!("{line}"),
        }
        Ok(())
    }

    fn revealed_line(&self, recipe: &Recipe) -> String {
        if self.skin.is_some() {
            format!("*revealed* **{}**", recipe.name)
        } else {
            format!("Revealed: {}", recipe.name)
        }
    }

    /// Image state as a listing fragment: emphasised when rich, the plain
    /// label otherwise.
    pub fn image_label(&self, status: &ImageStatus) -> String {
        if self.skin.is_none() {
            return status.to_string();
        }
        match status {
            ImageStatus::Ready { .. } => format!("**{status}**"),
            ImageStatus::Loading => "*loading*".to_string(),
            ImageStatus::Error => "~~error~~".to_string(),
            ImageStatus::Empty => status.to_string(),
        }
    }
}

fn recipe_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.set_headers_fg(Color::Green);
    skin.bold.set_fg(Color::Yellow);
    skin.italic.set_fg(Color::Cyan);
    skin.strikeout.set_fg(Color::Red);
    skin.inline_code.set_bg(Color::AnsiValue(238));
    skin
}
