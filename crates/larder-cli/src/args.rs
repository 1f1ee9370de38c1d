use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{GenerateArgs, MineCommands, SavedCommands};

/// Recipe ideas built around a single ingredient
///
/// Larder asks a generative-AI service for recipe ideas, lets you bookmark
/// the ones you like and keeps your own recipes alongside them. Collections
/// are stored per account in a local SQLite database.
#[derive(Parser)]
#[command(version, about, name = "larder")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/larder/larder.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Pause in milliseconds before each generated recipe is shown. Defaults
    /// to 300
    #[arg(long, global = true, value_name = "MS")]
    pub reveal_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Larder CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Signup {
        /// Account email
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Sign in to an existing account
    Login {
        /// Account email
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Generate recipe ideas for an ingredient
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Manage saved recipes
    #[command(alias = "s")]
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Manage your own recipes
    #[command(alias = "m")]
    Mine {
        #[command(subcommand)]
        command: MineCommands,
    },
}
