use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    AppointmentCommands, AvailabilityArgs, BackjobCommands, BookArgs, PenaltyCommands,
    ProfileCommands, SlotCommands,
};

/// Provider availability and appointment booking
///
/// Providers publish weekly-recurring availability slots; customers book a
/// slot on a specific calendar date, and the appointment then moves through
/// its lifecycle until it is completed, cancelled or marked as a no-show.
/// Everything is stored in a local SQLite database. The same operations are
/// exposed to AI assistants with `roster serve` (Model Context Protocol over
/// stdio).
#[derive(Parser)]
#[command(version, about, name = "roster", arg_required_else_help = true)]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/roster/roster.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Path to a JSON configuration file. Defaults to
    /// $XDG_CONFIG_HOME/roster/config.json when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Roster CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage a provider's weekly availability slots
    Slot {
        #[command(subcommand)]
        command: SlotCommands,
    },
    /// Show which slots of a provider are free on a date
    #[command(alias = "av")]
    Availability(AvailabilityArgs),
    /// Book a provider slot on a date
    Book(BookArgs),
    /// Inspect and progress appointments
    #[command(alias = "appt")]
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommands,
    },
    /// File and review warranty redo requests
    Backjob {
        #[command(subcommand)]
        command: BackjobCommands,
    },
    /// Manage customer and provider profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Inspect penalties
    Penalty {
        #[command(subcommand)]
        command: PenaltyCommands,
    },
    /// Start the MCP server
    Serve,
}
