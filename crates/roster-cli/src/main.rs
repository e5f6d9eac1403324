//! Roster CLI Application
//!
//! Command-line interface and MCP server for provider availability and
//! appointment booking.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, RosterMcpServer};
use renderer::TerminalRenderer;
use roster_core::{BookingEngineBuilder, EngineConfig};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        config,
        no_color,
        command,
    } = Args::parse();

    let config = EngineConfig::load(config.as_deref()).context("Failed to load configuration")?;
    let engine = BookingEngineBuilder::new()
        .with_database_path(database_file)
        .with_config(config)
        .build()
        .await
        .context("Failed to initialize booking engine")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Roster started");

    // arg_required_else_help prints usage before we get here
    let Some(command) = command else {
        return Ok(());
    };
    let cli = Cli::new(engine.clone(), renderer);

    let outcome = match command {
        Slot { command } => cli.handle_slot_command(command).await,
        Availability(args) => cli.show_availability(args).await,
        Book(args) => cli.book(args).await,
        Appointment { command } => cli.handle_appointment_command(command).await,
        Backjob { command } => cli.handle_backjob_command(command).await,
        Profile { command } => cli.handle_profile_command(command).await,
        Penalty { command } => cli.handle_penalty_command(command).await,
        Serve => {
            info!("Starting Roster MCP server");
            run_stdio_server(RosterMcpServer::new(engine.clone()))
                .await
                .context("MCP server failed")
        }
    };

    // penalty detection and notifications outlive the command otherwise
    engine.flush().await;
    outcome
}
