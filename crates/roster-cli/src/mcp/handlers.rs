//! MCP tool handlers implementation

use jiff::civil::Date;
use log::debug;
use roster_core::{
    display::{
        Appointments, Backjobs, CreateResult, DayAvailability, DeleteResult, NearbyProfiles,
        OperationStatus, Penalties, Slots, UpdateResult,
    },
    params as core, BookingEngine,
};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;

use super::errors::to_mcp_error;

// ============================================================================
// Generic Parameter Wrapper
// ============================================================================
//
// Core parameter types stay free of rmcp. The transparent wrapper passes
// deserialization straight through to the wrapped type and borrows its
// schema, so the tool schema is exactly the core struct's.

/// Transparent MCP wrapper around a core parameter type
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type AddSlot = McpParams<core::AddSlot>;
pub type UpdateSlot = McpParams<core::UpdateSlot>;
pub type DeleteSlot = McpParams<core::DeleteSlot>;
pub type ListSlots = McpParams<core::ListSlots>;
pub type ToggleDay = McpParams<core::ToggleDay>;
pub type ResolveAvailability = McpParams<core::ResolveAvailability>;
pub type CreateAppointment = McpParams<core::CreateAppointment>;
pub type CancelAppointment = McpParams<core::CancelAppointment>;
pub type ListAppointments = McpParams<core::ListAppointments>;
pub type TransitionStatus = McpParams<core::TransitionStatus>;
pub type ReportNoShow = McpParams<core::ReportNoShow>;
pub type RateAppointment = McpParams<core::RateAppointment>;
pub type FileBackjob = McpParams<core::FileBackjob>;
pub type ReviewBackjob = McpParams<core::ReviewBackjob>;
pub type UpsertProfile = McpParams<core::UpsertProfile>;
pub type NearbyProviders = McpParams<core::NearbyProviders>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    engine: BookingEngine,
}

impl McpHandlers {
    pub fn new(engine: BookingEngine) -> Self {
        Self { engine }
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    pub async fn add_slot(&self, Parameters(params): Parameters<AddSlot>) -> McpResult {
        debug!("add_slot: {:?}", params);
        let slot = self
            .engine
            .add_slot(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add slot", &e))?;
        text(CreateResult::new(slot))
    }

    pub async fn update_slot(&self, Parameters(params): Parameters<UpdateSlot>) -> McpResult {
        debug!("update_slot: {:?}", params);
        let inner = params.as_ref();
        let mut changes = Vec::new();
        if let Some(day) = &inner.day_of_week {
            changes.push(format!("day: {day}"));
        }
        if let Some(start) = &inner.start_time {
            changes.push(format!("start: {start}"));
        }
        if let Some(end) = &inner.end_time {
            changes.push(format!("end: {end}"));
        }
        if let Some(active) = inner.active {
            changes.push(format!("active: {active}"));
        }

        let slot = self
            .engine
            .update_slot(inner)
            .await
            .map_err(|e| to_mcp_error("Failed to update slot", &e))?;
        text(UpdateResult::with_changes(slot, changes))
    }

    pub async fn delete_slot(&self, Parameters(params): Parameters<DeleteSlot>) -> McpResult {
        debug!("delete_slot: {:?}", params);
        let slot = self
            .engine
            .delete_slot(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete slot", &e))?;
        text(DeleteResult::new(slot))
    }

    pub async fn list_slots(&self, Parameters(params): Parameters<ListSlots>) -> McpResult {
        debug!("list_slots: {:?}", params);
        let provider_id = params.as_ref().provider_id;
        let slots = self
            .engine
            .list_slots(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list slots", &e))?;
        text(format!("# Slots of provider {provider_id}\n\n{}", Slots(slots)))
    }

    pub async fn show_slot(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_slot: {:?}", params);
        let slot = self
            .engine
            .get_slot(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get slot", &e))?;
        text(slot)
    }

    pub async fn toggle_day(&self, Parameters(params): Parameters<ToggleDay>) -> McpResult {
        debug!("toggle_day: {:?}", params);
        let slots = self
            .engine
            .toggle_day(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to toggle day", &e))?;
        let status = OperationStatus::toggled(&slots);
        text(format!("{status}\n{}", Slots(slots)))
    }

    // ------------------------------------------------------------------
    // Availability and booking
    // ------------------------------------------------------------------

    pub async fn resolve_availability(
        &self,
        Parameters(params): Parameters<ResolveAvailability>,
    ) -> McpResult {
        debug!("resolve_availability: {:?}", params);
        let date: Date = params
            .as_ref()
            .validate()
            .map_err(|e| to_mcp_error("Failed to resolve availability", &e))?;
        let slots = self
            .engine
            .resolve_availability(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to resolve availability", &e))?;
        text(DayAvailability { date, slots })
    }

    pub async fn book_appointment(
        &self,
        Parameters(params): Parameters<CreateAppointment>,
    ) -> McpResult {
        debug!("book_appointment: {:?}", params);
        let appointment = self
            .engine
            .create_appointment(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to book appointment", &e))?;
        text(CreateResult::new(appointment))
    }

    pub async fn cancel_appointment(
        &self,
        Parameters(params): Parameters<CancelAppointment>,
    ) -> McpResult {
        debug!("cancel_appointment: {:?}", params);
        let appointment = self
            .engine
            .cancel_appointment(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to cancel appointment", &e))?;
        text(UpdateResult::with_changes(
            appointment,
            vec!["status: cancelled".to_string()],
        ))
    }

    // ------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------

    pub async fn show_appointment(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_appointment: {:?}", params);
        let appointment = self
            .engine
            .get_appointment(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get appointment", &e))?;
        text(appointment)
    }

    pub async fn list_appointments(
        &self,
        Parameters(params): Parameters<ListAppointments>,
    ) -> McpResult {
        debug!("list_appointments: {:?}", params);
        let appointments = self
            .engine
            .list_appointments(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list appointments", &e))?;
        text(format!("# Appointments\n\n{}", Appointments(appointments)))
    }

    pub async fn update_status(
        &self,
        Parameters(params): Parameters<TransitionStatus>,
    ) -> McpResult {
        debug!("update_status: {:?}", params);
        let appointment = self
            .engine
            .transition_status(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update status", &e))?;
        let change = format!("status: {}", appointment.status);
        text(UpdateResult::with_changes(appointment, vec![change]))
    }

    pub async fn report_no_show(&self, Parameters(params): Parameters<ReportNoShow>) -> McpResult {
        // evidence bytes are too noisy for the log
        debug!(
            "report_no_show: appointment {} by {}",
            params.as_ref().appointment_id,
            params.as_ref().customer_id
        );
        let appointment = self
            .engine
            .report_no_show(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to report no-show", &e))?;
        text(UpdateResult::with_changes(
            appointment,
            vec!["status: provider_no_show".to_string()],
        ))
    }

    pub async fn detect_penalties(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("detect_penalties: {:?}", params);
        let penalties = self
            .engine
            .detect_cancellation_penalties(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to detect penalties", &e))?;
        text(Penalties(penalties))
    }

    pub async fn list_penalties(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("list_penalties: {:?}", params);
        let user_id = params.as_ref().id;
        let penalties = self
            .engine
            .list_penalties(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list penalties", &e))?;
        text(format!("# Penalties for {user_id}\n\n{}", Penalties(penalties)))
    }

    // ------------------------------------------------------------------
    // Ratings and backjobs
    // ------------------------------------------------------------------

    pub async fn rate_appointment(
        &self,
        Parameters(params): Parameters<RateAppointment>,
    ) -> McpResult {
        debug!("rate_appointment: {:?}", params);
        let rating = self
            .engine
            .rate_appointment(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to rate appointment", &e))?;
        text(CreateResult::new(rating))
    }

    pub async fn file_backjob(&self, Parameters(params): Parameters<FileBackjob>) -> McpResult {
        debug!("file_backjob: {:?}", params);
        let backjob = self
            .engine
            .file_backjob(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to file backjob", &e))?;
        text(CreateResult::new(backjob))
    }

    pub async fn review_backjob(
        &self,
        Parameters(params): Parameters<ReviewBackjob>,
    ) -> McpResult {
        debug!("review_backjob: {:?}", params);
        let backjob = self
            .engine
            .review_backjob(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to review backjob", &e))?;
        let change = format!("status: {}", backjob.status);
        text(UpdateResult::with_changes(backjob, vec![change]))
    }

    pub async fn list_backjobs(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("list_backjobs: {:?}", params);
        let backjobs = self
            .engine
            .list_backjobs(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list backjobs", &e))?;
        text(Backjobs(backjobs))
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    pub async fn upsert_profile(
        &self,
        Parameters(params): Parameters<UpsertProfile>,
    ) -> McpResult {
        debug!("upsert_profile: {:?}", params);
        let profile = self
            .engine
            .upsert_profile(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to save profile", &e))?;
        text(profile)
    }

    pub async fn show_profile(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_profile: {:?}", params);
        let profile = self
            .engine
            .get_profile(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get profile", &e))?;
        text(profile)
    }

    pub async fn nearby_providers(
        &self,
        Parameters(params): Parameters<NearbyProviders>,
    ) -> McpResult {
        debug!("nearby_providers: {:?}", params);
        let ranked = self
            .engine
            .nearby_providers(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to rank providers", &e))?;
        text(format!("# Nearby providers\n\n{}", NearbyProfiles(ranked)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::{civil::date, tz::TimeZone};
    use roster_core::{BookingEngineBuilder, EngineConfig, FixedClock};
    use tempfile::TempDir;

    use super::*;

    async fn handlers() -> (TempDir, McpHandlers) {
        let dir = TempDir::new().unwrap();
        let now = date(2025, 1, 1)
            .at(8, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap();
        let engine = BookingEngineBuilder::new()
            .with_database_path(Some(dir.path().join("mcp.db")))
            .with_config(EngineConfig {
                time_zone: Some("UTC".to_string()),
                ..Default::default()
            })
            .with_clock(Arc::new(FixedClock::new(now)))
            .build()
            .await
            .unwrap();
        (dir, McpHandlers::new(engine))
    }

    fn params<T: JsonSchema + for<'de> Deserialize<'de>>(
        value: serde_json::Value,
    ) -> Parameters<McpParams<T>> {
        Parameters(serde_json::from_value(value).unwrap())
    }

    fn body(result: CallToolResult) -> String {
        serde_json::to_string(&result).unwrap()
    }

    #[tokio::test]
    async fn test_book_through_tools() {
        let (_dir, h) = handlers().await;
        h.upsert_profile(params(serde_json::json!({"id": 1, "full_name": "Alice Reyes"})))
            .await
            .unwrap();
        h.upsert_profile(params(serde_json::json!({"id": 2, "full_name": "Bob Cruz"})))
            .await
            .unwrap();

        let created = h
            .add_slot(params(serde_json::json!({
                "provider_id": 1,
                "day_of_week": "monday",
                "start_time": "09:00",
                "end_time": "10:00"
            })))
            .await
            .unwrap();
        assert!(body(created).contains("Created slot with ID: 1"));

        let booked = h
            .book_appointment(params(serde_json::json!({
                "customer_id": 2,
                "provider_id": 1,
                "service_id": 100,
                "date": "2025-01-06",
                "time": "09:00"
            })))
            .await
            .unwrap();
        assert!(body(booked).contains("Booked appointment with ID: 1"));

        let day = h
            .resolve_availability(params(serde_json::json!({
                "provider_id": 1,
                "date": "2025-01-06"
            })))
            .await
            .unwrap();
        assert!(body(day).contains("booked"));
    }

    #[tokio::test]
    async fn test_errors_carry_reason_code() {
        let (_dir, h) = handlers().await;

        let err = h
            .book_appointment(params(serde_json::json!({
                "customer_id": 2,
                "provider_id": 1,
                "service_id": 100,
                "date": "2025-01-06",
                "time": ""
            })))
            .await
            .unwrap_err();
        assert_eq!(err.data, Some(serde_json::json!({"code": "MISSING_FIELDS"})));

        let err = h
            .show_appointment(params(serde_json::json!({"id": 9})))
            .await
            .unwrap_err();
        assert_eq!(err.data, Some(serde_json::json!({"code": "NOT_FOUND"})));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let parsed: Result<ListSlots, _> =
            serde_json::from_value(serde_json::json!({"provider_id": 1, "weekday": "mon"}));
        assert!(parsed.is_err());
    }
}
