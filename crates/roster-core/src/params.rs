//! Parameter structures for roster operations
//!
//! Shared, interface-agnostic parameter structures used by the CLI and the MCP
//! server alike. Interface layers wrap them with their own derives (clap
//! `Args`, transparent serde wrappers) and convert into these types; the
//! engine facade only accepts these.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│  + validate()   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Every struct rejects unknown fields, and list-shaped fields are real
//! arrays. A payload that smuggles a JSON-encoded string where a structure is
//! expected fails deserialization instead of being stored raw.
//!
//! `validate()` turns the loosely-typed wire form (strings for days, dates,
//! times and statuses) into the typed requests in [`crate::models::requests`].

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{BookingError, Result},
    models::{
        parse_date, parse_time, AppointmentFilter, AppointmentStatus, DayOfWeek, GeoPoint,
        NewAppointment, NewSlot, ProfileUpdate, StatusChange, UpdateSlotRequest,
    },
};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for adding a recurring availability slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct AddSlot {
    /// Provider owning the slot
    pub provider_id: u64,
    /// Day of week, e.g. "monday" or "mon"
    pub day_of_week: String,
    /// Start time in HH:MM
    pub start_time: String,
    /// End time in HH:MM, after the start time
    pub end_time: String,
}

impl AddSlot {
    /// Parse day and times and check that the range is not empty.
    pub fn validate(&self) -> Result<NewSlot> {
        let day_of_week = self.day_of_week.parse::<DayOfWeek>()?;
        let start_time = parse_time("start_time", &self.start_time)?;
        let end_time = parse_time("end_time", &self.end_time)?;
        check_range(start_time, end_time)?;

        Ok(NewSlot {
            provider_id: self.provider_id,
            day_of_week,
            start_time,
            end_time,
        })
    }
}

/// Parameters for a partial slot update.
///
/// Only the supplied fields are parsed and changed. Overlap with sibling
/// slots is not re-checked on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct UpdateSlot {
    /// Slot to update
    pub slot_id: u64,
    /// Provider making the change; must own the slot
    pub provider_id: u64,
    /// New day of week
    pub day_of_week: Option<String>,
    /// New start time in HH:MM
    pub start_time: Option<String>,
    /// New end time in HH:MM
    pub end_time: Option<String>,
    /// Enable or disable the slot
    pub active: Option<bool>,
}

impl UpdateSlot {
    /// Parse the fields that are present.
    pub fn validate(&self) -> Result<UpdateSlotRequest> {
        let request = UpdateSlotRequest {
            day_of_week: self
                .day_of_week
                .as_deref()
                .map(str::parse::<DayOfWeek>)
                .transpose()?,
            start_time: self
                .start_time
                .as_deref()
                .map(|t| parse_time("start_time", t))
                .transpose()?,
            end_time: self
                .end_time
                .as_deref()
                .map(|t| parse_time("end_time", t))
                .transpose()?,
            active: self.active,
        };

        if request.is_empty() {
            return Err(BookingError::invalid_input("slot")
                .with_reason("At least one of day_of_week, start_time, end_time or active is required"));
        }
        if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
            check_range(start, end)?;
        }
        Ok(request)
    }
}

/// Parameters for deleting a slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct DeleteSlot {
    /// Slot to delete
    pub slot_id: u64,
    /// Provider making the change; must own the slot
    pub provider_id: u64,
}

/// Parameters for listing a provider's slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ListSlots {
    /// Provider whose slots to list
    pub provider_id: u64,
    /// Restrict to one day of week
    pub day_of_week: Option<String>,
}

impl ListSlots {
    /// Parse the optional day filter.
    pub fn validate(&self) -> Result<Option<DayOfWeek>> {
        self.day_of_week
            .as_deref()
            .map(str::parse::<DayOfWeek>)
            .transpose()
    }
}

/// Parameters for opening or closing every slot on a date's weekday.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ToggleDay {
    /// Provider owning the slots
    pub provider_id: u64,
    /// Any date falling on the weekday to toggle, YYYY-MM-DD
    pub date: String,
}

impl ToggleDay {
    /// Resolve the weekday of the given date.
    pub fn validate(&self) -> Result<DayOfWeek> {
        Ok(DayOfWeek::of(parse_date(&self.date)?))
    }
}

/// Parameters for resolving a provider's availability on a date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ResolveAvailability {
    /// Provider to resolve
    pub provider_id: u64,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
}

impl ResolveAvailability {
    /// Parse the date.
    pub fn validate(&self) -> Result<jiff::civil::Date> {
        parse_date(&self.date)
    }
}

/// Parameters for booking an appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct CreateAppointment {
    /// Customer making the booking
    pub customer_id: u64,
    /// Provider to book
    pub provider_id: u64,
    /// Service requested
    pub service_id: u64,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Slot start time in HH:MM; must equal a slot's start exactly
    pub time: String,
    /// Description of the problem or request
    pub description: Option<String>,
    /// Start as `accepted` instead of waiting for the provider
    #[serde(default)]
    pub auto_accept: bool,
}

impl CreateAppointment {
    /// Check that every required field is present, then parse date and time.
    ///
    /// All missing fields are reported together.
    pub fn validate(&self) -> Result<NewAppointment> {
        let mut missing = Vec::new();
        if self.customer_id == 0 {
            missing.push("customer_id");
        }
        if self.provider_id == 0 {
            missing.push("provider_id");
        }
        if self.service_id == 0 {
            missing.push("service_id");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        if self.time.trim().is_empty() {
            missing.push("time");
        }
        if !missing.is_empty() {
            return Err(BookingError::MissingFields {
                fields: missing.into_iter().map(String::from).collect(),
            });
        }

        Ok(NewAppointment {
            customer_id: self.customer_id,
            provider_id: self.provider_id,
            service_id: self.service_id,
            date: parse_date(self.date.trim())?,
            time: parse_time("time", self.time.trim())?,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            auto_accept: self.auto_accept,
        })
    }
}

/// Parameters for cancelling an appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct CancelAppointment {
    /// Appointment to cancel
    pub appointment_id: u64,
    /// Customer requesting the cancellation
    pub actor_id: u64,
    /// Why the appointment is cancelled
    pub reason: Option<String>,
}

/// Parameters for moving an appointment to a new status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct TransitionStatus {
    /// Appointment to update
    pub appointment_id: u64,
    /// Customer or provider requesting the change
    pub actor_id: u64,
    /// Target status, e.g. "accepted", "on_the_way", "finished"
    pub status: String,
    /// Final price, required when finishing
    pub final_price: Option<f64>,
}

impl TransitionStatus {
    /// Normalise the status literal and check the price when finishing.
    pub fn validate(&self) -> Result<StatusChange> {
        let target = self
            .status
            .parse::<AppointmentStatus>()
            .map_err(|_| BookingError::InvalidStatus {
                value: self.status.clone(),
            })?;

        if target == AppointmentStatus::Finished {
            match self.final_price {
                Some(price) if price.is_finite() && price > 0.0 => {}
                _ => {
                    return Err(BookingError::invalid_input("final_price")
                        .with_reason("A final price greater than zero is required to finish"))
                }
            }
        }

        Ok(StatusChange {
            appointment_id: self.appointment_id,
            actor_id: self.actor_id,
            target,
            final_price: self.final_price,
        })
    }
}

/// Parameters for reporting that the provider never arrived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ReportNoShow {
    /// Appointment the provider missed
    pub appointment_id: u64,
    /// Customer filing the report
    pub customer_id: u64,
    /// Photo evidence bytes
    #[serde(default)]
    pub evidence_photo: Vec<u8>,
    /// What happened
    #[serde(default)]
    pub description: String,
}

impl ReportNoShow {
    /// Both a photo and a description are required.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.evidence_photo.is_empty() {
            missing.push("an evidence photo");
        }
        if self.description.trim().is_empty() {
            missing.push("a description");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BookingError::MissingEvidence {
                missing: missing.join(" and "),
            })
        }
    }
}

/// Parameters for rating a completed appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RateAppointment {
    /// Appointment to rate
    pub appointment_id: u64,
    /// Customer giving the rating
    pub user_id: u64,
    /// Score from 1 to 5
    pub value: i64,
    /// Optional review text
    pub comment: Option<String>,
}

impl RateAppointment {
    /// Check the score range.
    pub fn validate(&self) -> Result<u8> {
        match u8::try_from(self.value) {
            Ok(value @ 1..=5) => Ok(value),
            _ => Err(BookingError::InvalidRating { value: self.value }),
        }
    }
}

/// Parameters for requesting a warranty redo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FileBackjob {
    /// Finished appointment to redo
    pub appointment_id: u64,
    /// Customer filing the request
    pub customer_id: u64,
    /// What needs redoing
    pub reason: String,
}

impl FileBackjob {
    /// A reason is required.
    pub fn validate(&self) -> Result<()> {
        if self.reason.trim().is_empty() {
            return Err(BookingError::MissingFields {
                fields: vec!["reason".to_string()],
            });
        }
        Ok(())
    }
}

/// Parameters for approving or rejecting a warranty redo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ReviewBackjob {
    /// Backjob to review
    pub backjob_id: u64,
    /// Provider of the original appointment
    pub provider_id: u64,
    /// Approve (true) or reject (false)
    pub approve: bool,
}

/// Parameters for inserting or replacing a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct UpsertProfile {
    /// Account ID
    pub id: u64,
    /// Full name
    pub full_name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Latitude in decimal degrees; requires longitude
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees; requires latitude
    pub longitude: Option<f64>,
}

impl UpsertProfile {
    /// Check required fields, email shape and coordinates.
    pub fn validate(&self) -> Result<ProfileUpdate> {
        let mut missing = Vec::new();
        if self.id == 0 {
            missing.push("id".to_string());
        }
        if self.full_name.trim().is_empty() {
            missing.push("full_name".to_string());
        }
        if !missing.is_empty() {
            return Err(BookingError::MissingFields { fields: missing });
        }

        let email = non_blank(self.email.as_deref());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(BookingError::invalid_input("email")
                    .with_reason(format!("'{email}' is not an email address")));
            }
        }

        let location = match (self.latitude, self.longitude) {
            (None, None) => None,
            (Some(latitude), Some(longitude)) => Some(validate_point(latitude, longitude)?),
            _ => {
                return Err(BookingError::invalid_input("location")
                    .with_reason("latitude and longitude must be given together"))
            }
        };

        Ok(ProfileUpdate {
            id: self.id,
            full_name: self.full_name.trim().to_string(),
            email,
            phone: non_blank(self.phone.as_deref()),
            location,
        })
    }
}

/// Parameters for ranking providers by distance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct NearbyProviders {
    /// Origin latitude in decimal degrees
    pub latitude: f64,
    /// Origin longitude in decimal degrees
    pub longitude: f64,
    /// Only providers within this many kilometres
    pub radius_km: Option<f64>,
    /// Return at most this many providers
    pub limit: Option<u32>,
}

impl NearbyProviders {
    /// Check the origin and radius.
    pub fn validate(&self) -> Result<GeoPoint> {
        if let Some(radius) = self.radius_km {
            if !radius.is_finite() || radius < 0.0 {
                return Err(BookingError::invalid_input("radius_km")
                    .with_reason("radius must be a non-negative number"));
            }
        }
        validate_point(self.latitude, self.longitude)
    }
}

/// Parameters for listing appointments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ListAppointments {
    /// Only this customer's appointments
    pub customer_id: Option<u64>,
    /// Only this provider's appointments
    pub provider_id: Option<u64>,
    /// Only appointments in this status
    pub status: Option<String>,
}

impl ListAppointments {
    /// Normalise the status filter.
    pub fn validate(&self) -> Result<AppointmentFilter> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                s.parse::<AppointmentStatus>()
                    .map_err(|_| BookingError::InvalidStatus {
                        value: s.to_string(),
                    })
            })
            .transpose()?;

        Ok(AppointmentFilter {
            customer_id: self.customer_id,
            provider_id: self.provider_id,
            status,
        })
    }
}

fn check_range(start: jiff::civil::Time, end: jiff::civil::Time) -> Result<()> {
    if start >= end {
        return Err(BookingError::InvalidRange {
            start: crate::models::format_time(start),
            end: crate::models::format_time(end),
        });
    }
    Ok(())
}

fn validate_point(latitude: f64, longitude: f64) -> Result<GeoPoint> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(BookingError::invalid_input("latitude")
            .with_reason(format!("{latitude} is outside -90..=90")));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(BookingError::invalid_input("longitude")
            .with_reason(format!("{longitude} is outside -180..=180")));
    }
    Ok(GeoPoint {
        latitude,
        longitude,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
