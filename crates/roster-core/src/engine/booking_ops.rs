//! Booking, cancellation and penalty operations for the BookingEngine.

use jiff::SignedDuration;

use super::BookingEngine;
use crate::{
    cancellation,
    db::appointment_queries::BookingRules,
    error::{BookingError, Result},
    models::{Appointment, AppointmentFilter, AppointmentStatus, Penalty},
    notify::BookingEvent,
    params::{CancelAppointment, CreateAppointment, Id, ListAppointments},
};

/// How far back other cancellations are read when looking for patterns.
const CANCELLATION_LOOKBACK: SignedDuration = SignedDuration::from_hours(48);

impl BookingEngine {
    /// Books the provider slot that starts at the requested date and time.
    ///
    /// Checks run in this order: required fields, the per-customer attempt
    /// budget, self-booking, the scheduled-booking cap, slot lookup, the
    /// booked check for that date, the same-day cutoff and finally the
    /// future check. The `booking_created` event is sent after commit.
    pub async fn create_appointment(&self, params: &CreateAppointment) -> Result<Appointment> {
        let request = params.validate()?;
        let now = self.now();
        let rules = BookingRules {
            window: self.window(&now),
            max_scheduled: self.config.max_scheduled_bookings,
        };
        let ts = now.timestamp();

        let limit = self.config.booking_rate_limit;
        let key = format!("booking:{}", request.customer_id);
        let decision = self
            .run(move |db| {
                db.hit_rate_limit(&key, limit.max_attempts, limit.window_secs, ts.as_second())
            })
            .await?;
        if !decision.allowed {
            return Err(BookingError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            });
        }

        let appointment = self
            .run(move |db| db.create_appointment(&request, &rules, ts))
            .await?;
        log::info!(
            "Customer {} booked appointment {} with provider {} for {}",
            appointment.customer_id,
            appointment.id,
            appointment.provider_id,
            appointment.scheduled_date
        );

        self.dispatch(BookingEvent::BookingCreated {
            appointment_id: appointment.id,
            customer_id: appointment.customer_id,
            provider_id: appointment.provider_id,
            scheduled_date: appointment.scheduled_date.to_string(),
            status: appointment.status,
        });
        Ok(appointment)
    }

    /// Cancels an appointment on behalf of its customer.
    ///
    /// Penalty detection runs afterwards in the background; its outcome
    /// never affects the cancellation. [`BookingEngine::flush`] waits for it.
    pub async fn cancel_appointment(&self, params: &CancelAppointment) -> Result<Appointment> {
        let (appointment_id, actor_id) = (params.appointment_id, params.actor_id);
        let reason = params
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let ts = self.now().timestamp();

        let cancelled = {
            let reason = reason.clone();
            self.run(move |db| db.cancel_appointment(appointment_id, actor_id, reason.as_deref(), ts))
                .await?
        };
        log::info!("Customer {actor_id} cancelled appointment {appointment_id}");

        self.dispatch(BookingEvent::AppointmentCancelled {
            appointment_id,
            customer_id: cancelled.customer_id,
            provider_id: cancelled.provider_id,
            reason,
        });

        let engine = self.clone();
        self.spawn_side_effect(async move {
            if let Err(e) = engine
                .detect_cancellation_penalties(&Id { id: appointment_id })
                .await
            {
                log::warn!("Penalty detection failed for appointment {appointment_id}: {e}");
            }
        });

        Ok(cancelled)
    }

    /// Looks for penalised cancellation patterns around a cancelled
    /// appointment and records what it finds.
    ///
    /// Safe to call more than once: a penalty already recorded for the same
    /// appointment and kind is kept as is. Returns the penalties now on
    /// record for the appointment.
    pub async fn detect_cancellation_penalties(&self, params: &Id) -> Result<Vec<Penalty>> {
        let appointment_id = params.id;
        let tz = self.now().time_zone().clone();
        let late_window = SignedDuration::from_mins(self.config.late_cancellation_minutes);

        self.run(move |db| {
            let appointment = db.get_appointment(appointment_id)?;
            let cancelled_at = match (appointment.status, appointment.cancelled_at) {
                (AppointmentStatus::Cancelled, Some(at)) => at,
                _ => return Ok(Vec::new()),
            };

            let since = cancelled_at
                .checked_sub(CANCELLATION_LOOKBACK)
                .unwrap_or(cancelled_at);
            let earlier: Vec<_> = db
                .cancellations_since(appointment.customer_id, appointment_id, since)?
                .into_iter()
                .filter(|at| *at <= cancelled_at)
                .map(|at| at.to_zoned(tz.clone()).datetime())
                .collect();

            let local_cancelled_at = cancelled_at.to_zoned(tz.clone()).datetime();
            let findings =
                cancellation::detect(&appointment, local_cancelled_at, &earlier, late_window);
            for finding in &findings {
                if db.record_penalty(
                    appointment.customer_id,
                    appointment_id,
                    finding.kind,
                    &finding.detail,
                    cancelled_at,
                )? {
                    log::info!(
                        "Recorded {} penalty for customer {}",
                        finding.kind.as_str(),
                        appointment.customer_id
                    );
                }
            }

            Ok(db
                .list_penalties(appointment.customer_id)?
                .into_iter()
                .filter(|p| p.appointment_id == appointment_id)
                .collect())
        })
        .await
    }

    /// Retrieves an appointment by its ID.
    pub async fn get_appointment(&self, params: &Id) -> Result<Appointment> {
        let appointment_id = params.id;
        self.run(move |db| db.get_appointment(appointment_id)).await
    }

    /// Lists appointments, soonest first.
    pub async fn list_appointments(&self, params: &ListAppointments) -> Result<Vec<Appointment>> {
        let filter: AppointmentFilter = params.validate()?;
        self.run(move |db| db.list_appointments(&filter)).await
    }

    /// Penalties recorded against a customer or provider.
    pub async fn list_penalties(&self, params: &Id) -> Result<Vec<Penalty>> {
        let user_id = params.id;
        self.run(move |db| db.list_penalties(user_id)).await
    }
}
