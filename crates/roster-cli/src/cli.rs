//! Command-line argument wrappers and their handlers
//!
//! Each clap `Args` struct here mirrors one core parameter struct from
//! `roster_core::params` and converts into it with `From`, so clap attributes
//! never leak into the core crate:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → BookingEngine
//! ```
//!
//! [`Cli`] owns the engine and the renderer and turns every command into a
//! single engine call followed by a markdown render.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Args, Subcommand};
use jiff::civil::Date;
use roster_core::{
    display::{
        Appointments, Backjobs, CreateResult, DayAvailability, DeleteResult, NearbyProfiles,
        OperationStatus, Penalties, Slots, UpdateResult,
    },
    params::*,
    BookingEngine, BookingError,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Slots
// ============================================================================

/// Add a weekly-recurring slot
#[derive(Args)]
pub struct AddSlotArgs {
    #[arg(help = "Provider who owns the slot")]
    pub provider_id: u64,
    #[arg(help = "Day of week, e.g. monday or mon")]
    pub day: String,
    #[arg(help = "Start time, HH:MM")]
    pub start: String,
    #[arg(help = "End time, HH:MM")]
    pub end: String,
}

impl From<AddSlotArgs> for AddSlot {
    fn from(val: AddSlotArgs) -> Self {
        AddSlot {
            provider_id: val.provider_id,
            day_of_week: val.day,
            start_time: val.start,
            end_time: val.end,
        }
    }
}

/// Change a slot's day, times or active flag
///
/// Only the given fields change. Overlap with the provider's other slots is
/// not re-checked.
#[derive(Args)]
pub struct UpdateSlotArgs {
    #[arg(help = "Slot to update")]
    pub slot_id: u64,
    #[arg(long, help = "Provider who owns the slot")]
    pub provider: u64,
    #[arg(long, help = "New day of week")]
    pub day: Option<String>,
    #[arg(long, help = "New start time, HH:MM")]
    pub start: Option<String>,
    #[arg(long, help = "New end time, HH:MM")]
    pub end: Option<String>,
    #[arg(long, help = "Open (true) or close (false) the slot")]
    pub active: Option<bool>,
}

impl From<UpdateSlotArgs> for UpdateSlot {
    fn from(val: UpdateSlotArgs) -> Self {
        UpdateSlot {
            slot_id: val.slot_id,
            provider_id: val.provider,
            day_of_week: val.day,
            start_time: val.start,
            end_time: val.end,
            active: val.active,
        }
    }
}

/// Delete a slot permanently
#[derive(Args)]
pub struct DeleteSlotArgs {
    #[arg(help = "Slot to delete")]
    pub slot_id: u64,
    #[arg(long, help = "Provider who owns the slot")]
    pub provider: u64,
}

impl From<DeleteSlotArgs> for DeleteSlot {
    fn from(val: DeleteSlotArgs) -> Self {
        DeleteSlot {
            slot_id: val.slot_id,
            provider_id: val.provider,
        }
    }
}

/// List a provider's slots
#[derive(Args)]
pub struct ListSlotsArgs {
    #[arg(help = "Provider whose slots to list")]
    pub provider_id: u64,
    #[arg(long, help = "Only slots on this day of week")]
    pub day: Option<String>,
}

impl From<ListSlotsArgs> for ListSlots {
    fn from(val: ListSlotsArgs) -> Self {
        ListSlots {
            provider_id: val.provider_id,
            day_of_week: val.day,
        }
    }
}

/// Flip every slot on the weekday of a date between open and closed
///
/// If any slot on that weekday is active they are all closed, otherwise
/// they are all opened.
#[derive(Args)]
pub struct ToggleDayArgs {
    #[arg(help = "Provider whose slots to toggle")]
    pub provider_id: u64,
    #[arg(help = "Any date on the weekday to toggle, YYYY-MM-DD")]
    pub date: String,
}

impl From<ToggleDayArgs> for ToggleDay {
    fn from(val: ToggleDayArgs) -> Self {
        ToggleDay {
            provider_id: val.provider_id,
            date: val.date,
        }
    }
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Unique identifier")]
    pub id: u64,
}

impl From<ShowArgs> for Id {
    fn from(val: ShowArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum SlotCommands {
    /// Add a weekly-recurring slot
    #[command(alias = "a")]
    Add(AddSlotArgs),
    /// Change a slot
    #[command(alias = "u")]
    Update(UpdateSlotArgs),
    /// Delete a slot permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteSlotArgs),
    /// List a provider's slots
    #[command(aliases = ["l", "ls"])]
    List(ListSlotsArgs),
    /// Show one slot
    #[command(alias = "s")]
    Show(ShowArgs),
    /// Flip every slot of a weekday between open and closed
    #[command(alias = "t")]
    Toggle(ToggleDayArgs),
}

// ============================================================================
// Availability and booking
// ============================================================================

/// Per-date slot states for a provider
#[derive(Args)]
pub struct AvailabilityArgs {
    #[arg(help = "Provider to check")]
    pub provider_id: u64,
    #[arg(help = "Calendar date, YYYY-MM-DD")]
    pub date: String,
}

impl From<AvailabilityArgs> for ResolveAvailability {
    fn from(val: AvailabilityArgs) -> Self {
        ResolveAvailability {
            provider_id: val.provider_id,
            date: val.date,
        }
    }
}

/// Book the slot starting at a date and time
///
/// The time must match a slot's start exactly.
#[derive(Args)]
pub struct BookArgs {
    #[arg(help = "Customer making the booking")]
    pub customer_id: u64,
    #[arg(help = "Provider to book")]
    pub provider_id: u64,
    #[arg(help = "Calendar date, YYYY-MM-DD")]
    pub date: String,
    #[arg(help = "Slot start time, HH:MM")]
    pub time: String,
    #[arg(short, long, help = "Service requested")]
    pub service: u64,
    #[arg(short, long, help = "What the visit is about")]
    pub description: Option<String>,
    #[arg(long, help = "Start as accepted instead of pending")]
    pub auto_accept: bool,
}

impl From<BookArgs> for CreateAppointment {
    fn from(val: BookArgs) -> Self {
        CreateAppointment {
            customer_id: val.customer_id,
            provider_id: val.provider_id,
            service_id: val.service,
            date: val.date,
            time: val.time,
            description: val.description,
            auto_accept: val.auto_accept,
        }
    }
}

// ============================================================================
// Appointments
// ============================================================================

#[derive(Args)]
pub struct ListAppointmentsArgs {
    #[arg(long, help = "Only this customer's appointments")]
    pub customer: Option<u64>,
    #[arg(long, help = "Only this provider's appointments")]
    pub provider: Option<u64>,
    #[arg(long, help = "Only appointments in this status")]
    pub status: Option<String>,
}

impl From<ListAppointmentsArgs> for ListAppointments {
    fn from(val: ListAppointmentsArgs) -> Self {
        ListAppointments {
            customer_id: val.customer,
            provider_id: val.provider,
            status: val.status,
        }
    }
}

/// Cancel an appointment as its customer
#[derive(Args)]
pub struct CancelArgs {
    #[arg(help = "Appointment to cancel")]
    pub appointment_id: u64,
    #[arg(long, help = "Customer cancelling")]
    pub actor: u64,
    #[arg(short, long, help = "Why the appointment is cancelled")]
    pub reason: Option<String>,
}

impl From<CancelArgs> for CancelAppointment {
    fn from(val: CancelArgs) -> Self {
        CancelAppointment {
            appointment_id: val.appointment_id,
            actor_id: val.actor,
            reason: val.reason,
        }
    }
}

/// Move an appointment to a new status
///
/// Providers accept, set out, start and finish the work; customers sign off
/// finished work with `completed`. Finishing needs `--price`.
#[derive(Args)]
pub struct StatusArgs {
    #[arg(help = "Appointment to update")]
    pub appointment_id: u64,
    #[arg(help = "Target status, e.g. accepted, on_the_way, in_progress, finished")]
    pub status: String,
    #[arg(long, help = "Customer or provider making the change")]
    pub actor: u64,
    #[arg(long, help = "Final price, required when finishing")]
    pub price: Option<f64>,
}

impl From<StatusArgs> for TransitionStatus {
    fn from(val: StatusArgs) -> Self {
        TransitionStatus {
            appointment_id: val.appointment_id,
            actor_id: val.actor,
            status: val.status,
            final_price: val.price,
        }
    }
}

/// Report that the provider never arrived
#[derive(Args)]
pub struct NoShowArgs {
    #[arg(help = "Appointment the provider missed")]
    pub appointment_id: u64,
    #[arg(long, help = "Customer filing the report")]
    pub customer: u64,
    #[arg(long, help = "Path to a photo proving the visit did not happen")]
    pub photo: PathBuf,
    #[arg(short, long, help = "What happened")]
    pub description: String,
}

/// Rate a completed appointment
#[derive(Args)]
pub struct RateArgs {
    #[arg(help = "Appointment to rate")]
    pub appointment_id: u64,
    #[arg(help = "Score from 1 to 5")]
    pub value: i64,
    #[arg(long, help = "Customer giving the rating")]
    pub user: u64,
    #[arg(short, long, help = "Review text")]
    pub comment: Option<String>,
}

impl From<RateArgs> for RateAppointment {
    fn from(val: RateArgs) -> Self {
        RateAppointment {
            appointment_id: val.appointment_id,
            user_id: val.user,
            value: val.value,
            comment: val.comment,
        }
    }
}

#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Show one appointment
    #[command(alias = "s")]
    Show(ShowArgs),
    /// List appointments, soonest first
    #[command(aliases = ["l", "ls"])]
    List(ListAppointmentsArgs),
    /// Cancel an appointment
    #[command(alias = "c")]
    Cancel(CancelArgs),
    /// Move an appointment to a new status
    #[command(alias = "st")]
    Status(StatusArgs),
    /// Report a provider no-show with evidence
    NoShow(NoShowArgs),
    /// Rate a completed appointment
    #[command(alias = "r")]
    Rate(RateArgs),
}

// ============================================================================
// Backjobs, profiles and penalties
// ============================================================================

#[derive(Args)]
pub struct FileBackjobArgs {
    #[arg(help = "Finished appointment to redo")]
    pub appointment_id: u64,
    #[arg(long, help = "Customer filing the request")]
    pub customer: u64,
    #[arg(short, long, help = "What needs redoing")]
    pub reason: String,
}

impl From<FileBackjobArgs> for FileBackjob {
    fn from(val: FileBackjobArgs) -> Self {
        FileBackjob {
            appointment_id: val.appointment_id,
            customer_id: val.customer,
            reason: val.reason,
        }
    }
}

/// Approve or reject a pending backjob
///
/// Approval re-opens the appointment as accepted so the work can be redone.
#[derive(Args)]
#[command(group(ArgGroup::new("decision").required(true).args(["approve", "reject"])))]
pub struct ReviewBackjobArgs {
    #[arg(help = "Backjob to review")]
    pub backjob_id: u64,
    #[arg(long, help = "Provider of the original appointment")]
    pub provider: u64,
    #[arg(long)]
    pub approve: bool,
    #[arg(long)]
    pub reject: bool,
}

impl From<ReviewBackjobArgs> for ReviewBackjob {
    fn from(val: ReviewBackjobArgs) -> Self {
        ReviewBackjob {
            backjob_id: val.backjob_id,
            provider_id: val.provider,
            approve: val.approve && !val.reject,
        }
    }
}

#[derive(Subcommand)]
pub enum BackjobCommands {
    /// Request a redo of finished work
    #[command(alias = "f")]
    File(FileBackjobArgs),
    /// Approve or reject a backjob
    #[command(alias = "r")]
    Review(ReviewBackjobArgs),
    /// List backjobs filed against an appointment
    #[command(aliases = ["l", "ls"])]
    List(ShowArgs),
}

#[derive(Args)]
pub struct UpsertProfileArgs {
    #[arg(help = "Account ID")]
    pub id: u64,
    #[arg(help = "Full name")]
    pub full_name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,
}

impl From<UpsertProfileArgs> for UpsertProfile {
    fn from(val: UpsertProfileArgs) -> Self {
        UpsertProfile {
            id: val.id,
            full_name: val.full_name,
            email: val.email,
            phone: val.phone,
            latitude: val.lat,
            longitude: val.lon,
        }
    }
}

/// Providers nearest to a point
///
/// Only providers with a location and at least one active slot are ranked.
#[derive(Args)]
pub struct NearbyArgs {
    #[arg(help = "Latitude in decimal degrees", allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(help = "Longitude in decimal degrees", allow_negative_numbers = true)]
    pub lon: f64,
    #[arg(long, help = "Only providers within this many kilometres")]
    pub radius: Option<f64>,
    #[arg(long, help = "Return at most this many providers")]
    pub limit: Option<u32>,
}

impl From<NearbyArgs> for NearbyProviders {
    fn from(val: NearbyArgs) -> Self {
        NearbyProviders {
            latitude: val.lat,
            longitude: val.lon,
            radius_km: val.radius,
            limit: val.limit,
        }
    }
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create or replace a profile
    #[command(alias = "u")]
    Upsert(UpsertProfileArgs),
    /// Show a profile
    #[command(alias = "s")]
    Show(ShowArgs),
    /// Rank providers by distance
    #[command(alias = "n")]
    Nearby(NearbyArgs),
}

#[derive(Subcommand)]
pub enum PenaltyCommands {
    /// Penalties recorded against a customer or provider
    #[command(aliases = ["l", "ls"])]
    List(ShowArgs),
    /// Re-run cancellation penalty detection for an appointment
    Detect(ShowArgs),
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs CLI commands against a [`BookingEngine`].
pub struct Cli {
    engine: BookingEngine,
    renderer: TerminalRenderer,
}

/// Carries the reason code into the process error message.
fn failed(error: BookingError) -> anyhow::Error {
    anyhow!("[{}] {error}", error.code())
}

impl Cli {
    pub fn new(engine: BookingEngine, renderer: TerminalRenderer) -> Self {
        Self { engine, renderer }
    }

    pub async fn handle_slot_command(&self, command: SlotCommands) -> Result<()> {
        let output = match command {
            SlotCommands::Add(args) => {
                let slot = self.engine.add_slot(&args.into()).await.map_err(failed)?;
                CreateResult::new(slot).to_string()
            }
            SlotCommands::Update(args) => {
                let slot = self.engine.update_slot(&args.into()).await.map_err(failed)?;
                UpdateResult::new(slot).to_string()
            }
            SlotCommands::Delete(args) => {
                let slot = self.engine.delete_slot(&args.into()).await.map_err(failed)?;
                DeleteResult::new(slot).to_string()
            }
            SlotCommands::List(args) => {
                let provider_id = args.provider_id;
                let slots = self.engine.list_slots(&args.into()).await.map_err(failed)?;
                format!("# Slots of provider {provider_id}\n\n{}", Slots(slots))
            }
            SlotCommands::Show(args) => {
                let slot = self.engine.get_slot(&args.into()).await.map_err(failed)?;
                slot.to_string()
            }
            SlotCommands::Toggle(args) => {
                let slots = self.engine.toggle_day(&args.into()).await.map_err(failed)?;
                format!("{}\n{}", OperationStatus::toggled(&slots), Slots(slots))
            }
        };
        self.renderer.render(&output)
    }

    pub async fn show_availability(&self, args: AvailabilityArgs) -> Result<()> {
        let params: ResolveAvailability = args.into();
        let date: Date = params.validate().map_err(failed)?;
        let slots = self
            .engine
            .resolve_availability(&params)
            .await
            .map_err(failed)?;
        self.renderer.render(&DayAvailability { date, slots }.to_string())
    }

    pub async fn book(&self, args: BookArgs) -> Result<()> {
        let appointment = self
            .engine
            .create_appointment(&args.into())
            .await
            .map_err(failed)?;
        self.renderer.render(&CreateResult::new(appointment).to_string())
    }

    pub async fn handle_appointment_command(&self, command: AppointmentCommands) -> Result<()> {
        let output = match command {
            AppointmentCommands::Show(args) => self
                .engine
                .get_appointment(&args.into())
                .await
                .map_err(failed)?
                .to_string(),
            AppointmentCommands::List(args) => {
                let appointments = self
                    .engine
                    .list_appointments(&args.into())
                    .await
                    .map_err(failed)?;
                format!("# Appointments\n\n{}", Appointments(appointments))
            }
            AppointmentCommands::Cancel(args) => {
                let appointment = self
                    .engine
                    .cancel_appointment(&args.into())
                    .await
                    .map_err(failed)?;
                UpdateResult::with_changes(appointment, vec!["status: cancelled".to_string()])
                    .to_string()
            }
            AppointmentCommands::Status(args) => {
                let appointment = self
                    .engine
                    .transition_status(&args.into())
                    .await
                    .map_err(failed)?;
                let change = format!("status: {}", appointment.status);
                UpdateResult::with_changes(appointment, vec![change]).to_string()
            }
            AppointmentCommands::NoShow(args) => {
                let photo = std::fs::read(&args.photo)
                    .with_context(|| format!("Failed to read {}", args.photo.display()))?;
                let appointment = self
                    .engine
                    .report_no_show(&ReportNoShow {
                        appointment_id: args.appointment_id,
                        customer_id: args.customer,
                        evidence_photo: photo,
                        description: args.description,
                    })
                    .await
                    .map_err(failed)?;
                UpdateResult::with_changes(appointment, vec!["status: provider_no_show".to_string()])
                    .to_string()
            }
            AppointmentCommands::Rate(args) => {
                let rating = self
                    .engine
                    .rate_appointment(&args.into())
                    .await
                    .map_err(failed)?;
                CreateResult::new(rating).to_string()
            }
        };
        self.renderer.render(&output)
    }

    pub async fn handle_backjob_command(&self, command: BackjobCommands) -> Result<()> {
        let output = match command {
            BackjobCommands::File(args) => {
                let backjob = self.engine.file_backjob(&args.into()).await.map_err(failed)?;
                CreateResult::new(backjob).to_string()
            }
            BackjobCommands::Review(args) => {
                let backjob = self
                    .engine
                    .review_backjob(&args.into())
                    .await
                    .map_err(failed)?;
                let change = format!("status: {}", backjob.status);
                UpdateResult::with_changes(backjob, vec![change]).to_string()
            }
            BackjobCommands::List(args) => {
                let appointment_id = args.id;
                let backjobs = self
                    .engine
                    .list_backjobs(&args.into())
                    .await
                    .map_err(failed)?;
                format!(
                    "# Backjobs for appointment {appointment_id}\n\n{}",
                    Backjobs(backjobs)
                )
            }
        };
        self.renderer.render(&output)
    }

    pub async fn handle_profile_command(&self, command: ProfileCommands) -> Result<()> {
        let output = match command {
            ProfileCommands::Upsert(args) => self
                .engine
                .upsert_profile(&args.into())
                .await
                .map_err(failed)?
                .to_string(),
            ProfileCommands::Show(args) => self
                .engine
                .get_profile(&args.into())
                .await
                .map_err(failed)?
                .to_string(),
            ProfileCommands::Nearby(args) => {
                let ranked = self
                    .engine
                    .nearby_providers(&args.into())
                    .await
                    .map_err(failed)?;
                format!("# Nearby providers\n\n{}", NearbyProfiles(ranked))
            }
        };
        self.renderer.render(&output)
    }

    pub async fn handle_penalty_command(&self, command: PenaltyCommands) -> Result<()> {
        let output = match command {
            PenaltyCommands::List(args) => {
                let user_id = args.id;
                let penalties = self
                    .engine
                    .list_penalties(&args.into())
                    .await
                    .map_err(failed)?;
                format!("# Penalties for {user_id}\n\n{}", Penalties(penalties))
            }
            PenaltyCommands::Detect(args) => {
                let penalties = self
                    .engine
                    .detect_cancellation_penalties(&args.into())
                    .await
                    .map_err(failed)?;
                Penalties(penalties).to_string()
            }
        };
        self.renderer.render(&output)
    }
}
