//! Cocoa CLI
//!
//! Command-line front end for the Cocoa project dashboard wizards.

mod args;
mod cli;
mod renderer;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use cocoa_core::{HttpBackend, SettingsBuilder};
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        api_url,
        timeout,
        config_file,
        no_color,
        command,
    } = Args::parse();

    let settings = SettingsBuilder::new()
        .with_config_file(config_file)
        .with_base_url(api_url)
        .with_timeout(timeout.map(Duration::from_secs))
        .build()
        .context("Failed to load settings")?;
    let backend = HttpBackend::new(&settings).context("Failed to initialize backend client")?;

    info!("Cocoa started against {}", backend.base_url());
    let cli = Cli::new(Arc::new(backend), TerminalRenderer::new(!no_color));

    match command {
        Validate(args) => cli.validate(args),
        Deliverable { command } => cli.handle_deliverable_command(command).await,
        Objective { command } => cli.handle_objective_command(command).await,
        Activity { command } => cli.handle_activity_command(command).await,
        Sheet { command } => cli.handle_sheet_command(command).await,
        Schema(args) => cli.schema(args),
    }
}
