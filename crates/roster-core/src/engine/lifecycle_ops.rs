//! Lifecycle operations for the BookingEngine.

use std::sync::Arc;

use tokio::task;

use super::BookingEngine;
use crate::{
    error::{BookingError, Result},
    models::{Appointment, AppointmentStatus},
    notify::BookingEvent,
    params::{CancelAppointment, ReportNoShow, TransitionStatus},
};

impl BookingEngine {
    /// Moves an appointment to a new status on behalf of the customer or
    /// provider.
    ///
    /// A target of `cancelled` follows the cancellation rules. A
    /// `provider_no_show` needs evidence and must go through
    /// [`Self::report_no_show`].
    pub async fn transition_status(&self, params: &TransitionStatus) -> Result<Appointment> {
        let change = params.validate()?;

        match change.target {
            AppointmentStatus::Cancelled => {
                return self
                    .cancel_appointment(&CancelAppointment {
                        appointment_id: change.appointment_id,
                        actor_id: change.actor_id,
                        reason: None,
                    })
                    .await;
            }
            AppointmentStatus::ProviderNoShow => {
                return Err(BookingError::MissingEvidence {
                    missing: "an evidence photo and a description".to_string(),
                });
            }
            _ => {}
        }

        let now = self.now();
        let (local, ts) = (now.datetime(), now.timestamp());
        let done = self
            .run(move |db| db.transition(&change, local, ts))
            .await?;

        let appointment = done.appointment;
        log::info!(
            "Appointment {} moved from {} to {}",
            appointment.id,
            done.previous.as_str(),
            appointment.status.as_str()
        );
        if done.completed_backjobs > 0 {
            log::info!(
                "Completed {} backjob(s) for appointment {}",
                done.completed_backjobs,
                appointment.id
            );
        }

        self.dispatch(BookingEvent::StatusChanged {
            appointment_id: appointment.id,
            customer_id: appointment.customer_id,
            provider_id: appointment.provider_id,
            from: done.previous,
            to: appointment.status,
        });
        Ok(appointment)
    }

    /// Reports that the provider never arrived for a scheduled appointment.
    ///
    /// The report is checked before the photo is stored, so a rejected
    /// report leaves no evidence behind. A storage failure fails the report.
    pub async fn report_no_show(&self, params: &ReportNoShow) -> Result<Appointment> {
        params.validate()?;
        let (appointment_id, customer_id) = (params.appointment_id, params.customer_id);
        let description = params.description.trim().to_string();

        let now = self.now();
        let (local, ts) = (now.datetime(), now.timestamp());
        self.run(move |db| db.precheck_provider_no_show(appointment_id, customer_id, local))
            .await?;

        let evidence = Arc::clone(&self.evidence);
        let photo = params.evidence_photo.clone();
        let url = task::spawn_blocking(move || evidence.store(appointment_id, &photo))
            .await
            .map_err(|e| BookingError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        let appointment = self
            .run(move |db| {
                db.report_provider_no_show(
                    appointment_id,
                    customer_id,
                    &url,
                    &description,
                    local,
                    ts,
                )
            })
            .await?;
        log::info!(
            "Customer {customer_id} reported provider {} absent for appointment {appointment_id}",
            appointment.provider_id
        );

        self.dispatch(BookingEvent::ProviderNoShowReported {
            appointment_id,
            customer_id,
            provider_id: appointment.provider_id,
        });
        Ok(appointment)
    }
}
