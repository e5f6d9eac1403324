//! Rating and backjob operations for the BookingEngine.

use super::BookingEngine;
use crate::{
    error::Result,
    models::{Backjob, Rating},
    params::{FileBackjob, Id, RateAppointment, ReviewBackjob},
};

impl BookingEngine {
    /// Rates a completed appointment, once.
    pub async fn rate_appointment(&self, params: &RateAppointment) -> Result<Rating> {
        let value = params.validate()?;
        let (appointment_id, user_id) = (params.appointment_id, params.user_id);
        let comment = params.comment.clone();
        let ts = self.now().timestamp();

        self.run(move |db| db.create_rating(appointment_id, user_id, value, comment.as_deref(), ts))
            .await
    }

    /// Files a warranty redo request for a finished appointment.
    pub async fn file_backjob(&self, params: &FileBackjob) -> Result<Backjob> {
        params.validate()?;
        let (appointment_id, customer_id) = (params.appointment_id, params.customer_id);
        let reason = params.reason.trim().to_string();
        let ts = self.now().timestamp();

        let backjob = self
            .run(move |db| db.file_backjob(appointment_id, customer_id, &reason, ts))
            .await?;
        log::info!("Customer {customer_id} filed backjob {} for appointment {appointment_id}", backjob.id);
        Ok(backjob)
    }

    /// Approves or rejects a pending backjob.
    pub async fn review_backjob(&self, params: &ReviewBackjob) -> Result<Backjob> {
        let (backjob_id, provider_id, approve) =
            (params.backjob_id, params.provider_id, params.approve);
        let ts = self.now().timestamp();

        let backjob = self
            .run(move |db| db.review_backjob(backjob_id, provider_id, approve, ts))
            .await?;
        log::info!("Provider {provider_id} marked backjob {backjob_id} {}", backjob.status.as_str());
        Ok(backjob)
    }

    /// Backjobs filed against an appointment.
    pub async fn list_backjobs(&self, params: &Id) -> Result<Vec<Backjob>> {
        let appointment_id = params.id;
        self.run(move |db| db.list_backjobs(appointment_id)).await
    }
}
