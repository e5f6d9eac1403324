//! MCP server for Roster
//!
//! Exposes every booking operation as a Model Context Protocol tool over
//! stdio. Tool results are the same markdown the CLI prints; failures come
//! back as MCP errors whose `data.code` carries the booking reason code.

use anyhow::Result;
use log::{debug, error, info};
use roster_core::BookingEngine;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{
    AddSlot, CancelAppointment, CreateAppointment, DeleteSlot, FileBackjob, Id,
    ListAppointments, ListSlots, McpResult, NearbyProviders, RateAppointment, ReportNoShow,
    ResolveAvailability, ReviewBackjob, ToggleDay, TransitionStatus, UpdateSlot, UpsertProfile,
};

/// MCP server for Roster
#[derive(Clone)]
pub struct RosterMcpServer {
    engine: BookingEngine,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RosterMcpServer {
    pub fn new(engine: BookingEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.engine.clone())
    }

    #[tool(
        name = "add_slot",
        description = "Add a weekly-recurring availability slot for a provider. Give provider_id, day_of_week (e.g. 'monday' or 'mon'), start_time and end_time as HH:MM. Start must be before end, and the slot must not overlap or touch another slot of the same provider on that day."
    )]
    async fn add_slot(&self, params: Parameters<AddSlot>) -> McpResult {
        self.handlers().add_slot(params).await
    }

    #[tool(
        name = "update_slot",
        description = "Change a slot's day_of_week, start_time, end_time or active flag. Only the fields you pass change. provider_id must own the slot. Setting active=false hides the slot from availability without deleting it."
    )]
    async fn update_slot(&self, params: Parameters<UpdateSlot>) -> McpResult {
        self.handlers().update_slot(params).await
    }

    #[tool(
        name = "delete_slot",
        description = "Permanently delete a slot owned by provider_id. Appointments already booked on it keep their date and time but lose the slot reference."
    )]
    async fn delete_slot(&self, params: Parameters<DeleteSlot>) -> McpResult {
        self.handlers().delete_slot(params).await
    }

    #[tool(
        name = "list_slots",
        description = "List a provider's weekly slots ordered by day and start time. Pass day_of_week to restrict the list to one day."
    )]
    async fn list_slots(&self, params: Parameters<ListSlots>) -> McpResult {
        self.handlers().list_slots(params).await
    }

    #[tool(
        name = "show_slot",
        description = "Show a single slot by ID."
    )]
    async fn show_slot(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_slot(params).await
    }

    #[tool(
        name = "toggle_day",
        description = "Flip the active flag of every slot a provider has on the weekday of the given date (YYYY-MM-DD): open slots close and closed slots open. Fails with OVERLAP, changing nothing, if two slots that would end up open overlap or touch. Use it to take a day off and to return."
    )]
    async fn toggle_day(&self, params: Parameters<ToggleDay>) -> McpResult {
        self.handlers().toggle_day(params).await
    }

    #[tool(
        name = "resolve_availability",
        description = "Show every active slot of a provider on a calendar date (YYYY-MM-DD) with its state: available, booked, past (the date is before today) or closed_for_today (same-day bookings stop at the cutoff hour). Call this before booking."
    )]
    async fn resolve_availability(&self, params: Parameters<ResolveAvailability>) -> McpResult {
        self.handlers().resolve_availability(params).await
    }

    #[tool(
        name = "book_appointment",
        description = "Book a provider's slot on a date for a customer. time must equal a slot's start_time exactly. Fails when the slot is already booked for that date, when the time is in the past or past the same-day cutoff, when the customer already holds the maximum number of scheduled appointments, or when customer and provider are the same person. auto_accept=true starts the appointment as accepted instead of pending."
    )]
    async fn book_appointment(&self, params: Parameters<CreateAppointment>) -> McpResult {
        self.handlers().book_appointment(params).await
    }

    #[tool(
        name = "cancel_appointment",
        description = "Cancel an appointment as its customer (actor_id). Only pending or committed (accepted, approved, confirmed, scheduled) appointments can be cancelled. Cancelling shortly before the start, or repeatedly on the same day, records a penalty against the customer."
    )]
    async fn cancel_appointment(&self, params: Parameters<CancelAppointment>) -> McpResult {
        self.handlers().cancel_appointment(params).await
    }

    #[tool(
        name = "show_appointment",
        description = "Show an appointment with its status, visit time, participants and lifecycle timestamps."
    )]
    async fn show_appointment(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_appointment(params).await
    }

    #[tool(
        name = "list_appointments",
        description = "List appointments soonest first, optionally filtered by customer_id, provider_id and status."
    )]
    async fn list_appointments(&self, params: Parameters<ListAppointments>) -> McpResult {
        self.handlers().list_appointments(params).await
    }

    #[tool(
        name = "update_status",
        description = "Move an appointment along its lifecycle. The provider (actor_id) moves pending → accepted → on_the_way → in_progress → finished; finishing requires final_price. The customer then confirms with completed. The provider may also reject, or record no_show once the start time has passed."
    )]
    async fn update_status(&self, params: Parameters<TransitionStatus>) -> McpResult {
        self.handlers().update_status(params).await
    }

    #[tool(
        name = "report_no_show",
        description = "Customer reports that the provider never arrived at a scheduled appointment. Requires evidence_photo bytes and a description, and is only accepted once the booked slot has ended. Records a penalty against the provider."
    )]
    async fn report_no_show(&self, params: Parameters<ReportNoShow>) -> McpResult {
        self.handlers().report_no_show(params).await
    }

    #[tool(
        name = "detect_penalties",
        description = "Re-run cancellation penalty detection for a cancelled appointment. Penalties already recorded are not duplicated."
    )]
    async fn detect_penalties(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().detect_penalties(params).await
    }

    #[tool(
        name = "list_penalties",
        description = "List the penalties recorded against a user ID, oldest first."
    )]
    async fn list_penalties(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().list_penalties(params).await
    }

    #[tool(
        name = "rate_appointment",
        description = "Rate a completed appointment from 1 to 5 with an optional comment. Only the customer can rate, and only once."
    )]
    async fn rate_appointment(&self, params: Parameters<RateAppointment>) -> McpResult {
        self.handlers().rate_appointment(params).await
    }

    #[tool(
        name = "file_backjob",
        description = "Ask the provider to redo finished work. The customer files it against a finished appointment with a reason. Finishing the appointment again closes the backjob."
    )]
    async fn file_backjob(&self, params: Parameters<FileBackjob>) -> McpResult {
        self.handlers().file_backjob(params).await
    }

    #[tool(
        name = "review_backjob",
        description = "Provider approves or rejects a pending backjob. Approval re-opens the appointment as accepted so the work can be redone."
    )]
    async fn review_backjob(&self, params: Parameters<ReviewBackjob>) -> McpResult {
        self.handlers().review_backjob(params).await
    }

    #[tool(
        name = "list_backjobs",
        description = "List backjobs filed against an appointment ID."
    )]
    async fn list_backjobs(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().list_backjobs(params).await
    }

    #[tool(
        name = "upsert_profile",
        description = "Create or replace a user profile. latitude and longitude must be given together; a provider without a location is never offered by nearby_providers."
    )]
    async fn upsert_profile(&self, params: Parameters<UpsertProfile>) -> McpResult {
        self.handlers().upsert_profile(params).await
    }

    #[tool(name = "show_profile", description = "Show a user profile by ID.")]
    async fn show_profile(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_profile(params).await
    }

    #[tool(
        name = "nearby_providers",
        description = "Rank providers with a location and at least one active slot by great-circle distance from a point, nearest first. radius_km and limit narrow the result."
    )]
    async fn nearby_providers(&self, params: Parameters<NearbyProviders>) -> McpResult {
        self.handlers().nearby_providers(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for RosterMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = "roster".to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some(r#"Roster books customers into providers' weekly availability.

## Core Concepts
- **Slots**: weekly-recurring windows a provider offers, e.g. every Monday 09:00-10:00
- **Appointments**: one slot on one calendar date for one customer; at most one active appointment per slot and date
- **Lifecycle**: pending → accepted → on_the_way → in_progress → finished → completed, with cancelled and the two no-show outcomes as other endings

## Booking Workflow
1. `resolve_availability` for the provider and date to see which slots are available
2. `book_appointment` with the exact start time of an available slot
3. The provider progresses it with `update_status`; the customer confirms with `completed`
4. `rate_appointment` or `file_backjob` afterwards

## Errors
Failures carry a reason code in the error data, e.g. SLOT_ALREADY_BOOKED, CLOSED_FOR_TODAY or BOOKING_LIMIT_REACHED. Validation errors are never worth retrying unchanged.

## Tool Categories
- **Slots**: add_slot, update_slot, delete_slot, list_slots, show_slot, toggle_day
- **Booking**: resolve_availability, book_appointment, cancel_appointment
- **Appointments**: show_appointment, list_appointments, update_status, report_no_show
- **Feedback**: rate_appointment, file_backjob, review_backjob, list_backjobs
- **Penalties**: detect_penalties, list_penalties
- **Profiles**: upsert_profile, show_profile, nearby_providers"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: RosterMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Roster MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_every_operation_is_a_tool() {
        let dir = TempDir::new().unwrap();
        let engine = roster_core::BookingEngineBuilder::new()
            .with_database_path(Some(dir.path().join("tools.db")))
            .build()
            .await
            .unwrap();
        let server = RosterMcpServer::new(engine);

        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names.len(), 22);
        for expected in ["book_appointment", "resolve_availability", "nearby_providers"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }

        let info = server.get_info();
        assert_eq!(info.server_info.name, "roster");
    }
}
