//! Filter types for querying appointments.

use super::AppointmentStatus;

/// Filter options for listing appointments. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    /// Only appointments booked by this customer
    pub customer_id: Option<u64>,

    /// Only appointments served by this provider
    pub provider_id: Option<u64>,

    /// Only appointments currently in this status
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    /// Appointments booked by one customer.
    pub fn for_customer(customer_id: u64) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Appointments served by one provider.
    pub fn for_provider(provider_id: u64) -> Self {
        Self {
            provider_id: Some(provider_id),
            ..Default::default()
        }
    }
}
