//! Appointment state machine.
//!
//! ```text
//! pending ─┬─▶ accepted | approved | confirmed | scheduled ─▶ on_the_way ─▶ in_progress ─▶ finished ─▶ completed
//!          └─▶ rejected
//! committed ─▶ rejected | no_show            scheduled ─▶ provider_no_show
//! pending | committed ─▶ cancelled
//! ```
//!
//! Committed means accepted, approved, confirmed or scheduled. Providers drive
//! the work forward; customers cancel, report a missing provider and sign off
//! finished work.

use crate::{
    error::{BookingError, Result},
    models::{Appointment, AppointmentStatus},
};

/// Which side of an appointment may request a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Provider,
}

impl Role {
    /// Side allowed to move an appointment into `target`.
    pub fn required_for(target: AppointmentStatus) -> Self {
        use AppointmentStatus::*;
        match target {
            Completed | Cancelled | ProviderNoShow => Role::Customer,
            Pending | Scheduled | Accepted | Approved | Confirmed | OnTheWay | InProgress
            | Finished | Rejected | NoShow => Role::Provider,
        }
    }

    /// True if `actor_id` plays this role on the appointment.
    pub fn is_played_by(&self, appointment: &Appointment, actor_id: u64) -> bool {
        match self {
            Role::Customer => appointment.customer_id == actor_id,
            Role::Provider => appointment.provider_id == actor_id,
        }
    }
}

/// Edge check, ignoring who asks.
pub fn is_allowed(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    match (from, to) {
        (Pending, Accepted | Approved | Confirmed | Scheduled | Rejected) => true,
        (from, OnTheWay | Rejected | NoShow) if from.is_committed() => true,
        (OnTheWay, InProgress) => true,
        (InProgress, Finished) => true,
        (Finished, Completed) => true,
        (from, Cancelled) if from.is_cancellable() => true,
        (Scheduled, ProviderNoShow) => true,
        _ => false,
    }
}

/// Every status reachable from `from` in one step.
pub fn valid_targets(from: AppointmentStatus) -> Vec<AppointmentStatus> {
    AppointmentStatus::ALL
        .into_iter()
        .filter(|to| is_allowed(from, *to))
        .collect()
}

/// Authorises and validates a transition of `appointment` to `target`.
///
/// Ownership is checked first so a stranger learns nothing about the state
/// of someone else's appointment.
pub fn check_transition(
    appointment: &Appointment,
    target: AppointmentStatus,
    actor_id: u64,
) -> Result<()> {
    let role = Role::required_for(target);
    if !role.is_played_by(appointment, actor_id) {
        return Err(BookingError::Forbidden {
            actor_id,
            action: format!(
                "move appointment {} to {}",
                appointment.id,
                target.as_str()
            ),
        });
    }

    if appointment.status.is_terminal() {
        return Err(BookingError::AlreadyTerminal {
            id: appointment.id,
            status: appointment.status.as_str().to_string(),
        });
    }

    if !is_allowed(appointment.status, target) {
        return Err(BookingError::InvalidTransition {
            from: appointment.status.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }

    Ok(())
}
