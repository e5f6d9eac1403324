//! Per-date availability for the BookingEngine.

use super::BookingEngine;
use crate::{error::Result, models::SlotAvailability, params::ResolveAvailability};

impl BookingEngine {
    /// Resolves each active slot of a provider on a calendar date.
    ///
    /// Nothing about the date is stored on the slot; the answer comes from
    /// the appointments pinned to that date and the current wall clock.
    pub async fn resolve_availability(
        &self,
        params: &ResolveAvailability,
    ) -> Result<Vec<SlotAvailability>> {
        let date = params.validate()?;
        let provider_id = params.provider_id;
        let window = self.window(&self.now());

        self.run(move |db| db.resolve_availability(provider_id, date, &window))
            .await
    }
}
