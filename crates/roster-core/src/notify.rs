//! Fire-and-forget booking events.
//!
//! The engine hands every event to a [`Notifier`] on a background task. A
//! failed or slow notifier is logged and never affects the operation that
//! raised the event.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::AppointmentStatus;

const CHANNEL_CAPACITY: usize = 256;

/// Structured payload handed to notification delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEvent {
    BookingCreated {
        appointment_id: u64,
        customer_id: u64,
        provider_id: u64,
        scheduled_date: String,
        status: AppointmentStatus,
    },
    StatusChanged {
        appointment_id: u64,
        customer_id: u64,
        provider_id: u64,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    AppointmentCancelled {
        appointment_id: u64,
        customer_id: u64,
        provider_id: u64,
        reason: Option<String>,
    },
    ProviderNoShowReported {
        appointment_id: u64,
        customer_id: u64,
        provider_id: u64,
    },
}

impl BookingEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BookingCreated { .. } => "booking_created",
            Self::StatusChanged { .. } => "status_changed",
            Self::AppointmentCancelled { .. } => "appointment_cancelled",
            Self::ProviderNoShowReported { .. } => "provider_no_show_reported",
        }
    }

    pub fn appointment_id(&self) -> u64 {
        match self {
            Self::BookingCreated { appointment_id, .. }
            | Self::StatusChanged { appointment_id, .. }
            | Self::AppointmentCancelled { appointment_id, .. }
            | Self::ProviderNoShowReported { appointment_id, .. } => *appointment_id,
        }
    }
}

/// Delivery failure. Only ever logged.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Accepts booking events for delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &BookingEvent) -> Result<(), NotifyError>;
}

/// In-process broadcast hub. Sending without subscribers is a no-op.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<BookingEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    /// Receive every event raised after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}
