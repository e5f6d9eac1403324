//! Display implementations for domain models.
//!
//! Kept apart from the model definitions. Everything renders as markdown so
//! the CLI can pass it straight to the terminal renderer and the MCP server
//! can return it as tool text.

use std::fmt;

use super::datetime::{LocalDateTime, VisitTime};
use crate::{
    geo::Ranked,
    models::{
        format_time, Appointment, AppointmentStatus, AvailabilitySlot, Backjob, BackjobStatus,
        DayOfWeek, Penalty, PenaltyKind, Profile, Rating, SlotAvailability, SlotState,
    },
};

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for BackjobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PenaltyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for AvailabilitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** {} {}-{}{}",
            self.id,
            self.day_of_week,
            format_time(self.start_time),
            format_time(self.end_time),
            if self.active { "" } else { " (inactive)" }
        )
    }
}

impl fmt::Display for SlotAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.status {
            SlotState::Available => "○",
            SlotState::Booked => "●",
            SlotState::Past | SlotState::ClosedForToday => "✗",
        };
        writeln!(
            f,
            "- {marker} {}-{} slot {}: {}",
            format_time(self.slot.start_time),
            format_time(self.slot.end_time),
            self.slot.id,
            self.status
        )
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# Appointment {} ({})",
            self.id,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        writeln!(f, "- When: {}", VisitTime(&self.scheduled_date))?;
        writeln!(f, "- Customer: {}", self.customer_id)?;
        writeln!(f, "- Provider: {}", self.provider_id)?;
        writeln!(f, "- Service: {}", self.service_id)?;
        match self.availability_slot_id {
            Some(slot) => writeln!(f, "- Slot: {slot}")?,
            None => writeln!(f, "- Slot: none")?,
        }
        if let Some(price) = self.final_price {
            writeln!(f, "- Final price: {price:.2}")?;
        }
        if let Some(at) = &self.cancelled_at {
            writeln!(f, "- Cancelled: {}", LocalDateTime(at))?;
        }
        writeln!(f, "- Booked: {}", LocalDateTime(&self.created_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }
        if let Some(reason) = &self.cancellation_reason {
            writeln!(f)?;
            writeln!(f, "Cancellation reason: {reason}")?;
        }
        if let Some(desc) = &self.no_show_description {
            writeln!(f)?;
            writeln!(f, "## No-show report")?;
            writeln!(f)?;
            writeln!(f, "{desc}")?;
            if let Some(url) = &self.no_show_evidence_url {
                writeln!(f)?;
                writeln!(f, "Evidence: {url}")?;
            }
        }

        Ok(())
    }
}

impl Appointment {
    /// One list line per appointment.
    pub(crate) fn fmt_line(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** {} customer {} / provider {} ({})",
            self.id,
            VisitTime(&self.scheduled_date),
            self.customer_id,
            self.provider_id,
            self.status.with_icon()
        )
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stars = "★".repeat(self.value as usize) + &"☆".repeat(5 - self.value.min(5) as usize);
        writeln!(
            f,
            "- Appointment {}: {stars} ({}/5)",
            self.appointment_id, self.value
        )?;
        if let Some(comment) = &self.comment {
            writeln!(f, "  > {comment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Backjob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** appointment {} ({}): {}",
            self.id, self.appointment_id, self.status, self.reason
        )
    }
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} on appointment {}: {} ({})",
            self.kind,
            self.appointment_id,
            self.detail,
            LocalDateTime(&self.created_at)
        )
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} (ID: {})", self.full_name, self.id)?;
        writeln!(f)?;
        if let Some(email) = &self.email {
            writeln!(f, "- Email: {email}")?;
        }
        if let Some(phone) = &self.phone {
            writeln!(f, "- Phone: {phone}")?;
        }
        if let Some(point) = &self.location {
            writeln!(f, "- Location: {:.5}, {:.5}", point.latitude, point.longitude)?;
        }
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))
    }
}

impl fmt::Display for Ranked<Profile> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** {}: {:.1} km",
            self.item.id, self.item.full_name, self.distance_km
        )
    }
}
