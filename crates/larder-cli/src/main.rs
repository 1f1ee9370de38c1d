//! Larder CLI Application
//!
//! Command-line interface for the larder recipe-idea tool.

mod args;
mod cli;
mod renderer;

use std::time::Duration;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use larder_core::LarderBuilder;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        reveal_delay_ms,
        command,
    } = Args::parse();

    let mut builder = LarderBuilder::new().with_database_path(database_file);
    if let Some(ms) = reveal_delay_ms {
        builder = builder.with_reveal_delay(Duration::from_millis(ms));
    }

    let larder = builder
        .build()
        .await
        .context("Failed to open larder")?;

    let renderer = TerminalRenderer::new(!no_color);
    let mut cli = Cli::new(larder, renderer);

    info!("Larder started");

    match command {
        Signup { email, password } => cli.signup(&email, &password),
        Login { email, password } => cli.login(&email, &password),
        Logout => cli.logout(),
        Whoami => cli.whoami(),
        Generate(args) => cli.generate(args).await,
        Saved { command } => cli.handle_saved_command(command),
        Mine { command } => cli.handle_mine_command(command),
    }
}
