//! Slot catalog operations for the BookingEngine.

use super::BookingEngine;
use crate::{
    error::{BookingError, Result},
    models::AvailabilitySlot,
    params::{AddSlot, DeleteSlot, Id, ListSlots, ToggleDay, UpdateSlot},
};

impl BookingEngine {
    /// Adds a recurring weekly slot for a provider.
    ///
    /// Rejected with `Overlap` if it intersects or touches another active
    /// slot of the same provider on the same weekday.
    pub async fn add_slot(&self, params: &AddSlot) -> Result<AvailabilitySlot> {
        let slot = params.validate()?;
        let now = self.now().timestamp();

        let created = self.run(move |db| db.add_slot(&slot, now)).await?;
        log::info!(
            "Provider {} added slot {} on {}",
            created.provider_id,
            created.id,
            created.day_of_week.as_str()
        );
        Ok(created)
    }

    /// Partially updates a slot owned by the provider.
    pub async fn update_slot(&self, params: &UpdateSlot) -> Result<AvailabilitySlot> {
        let request = params.validate()?;
        let (slot_id, provider_id) = (params.slot_id, params.provider_id);
        let now = self.now().timestamp();

        self.run(move |db| db.update_slot(slot_id, provider_id, &request, now))
            .await
    }

    /// Permanently deletes a slot. Existing appointments keep their
    /// reference to it.
    pub async fn delete_slot(&self, params: &DeleteSlot) -> Result<AvailabilitySlot> {
        let (slot_id, provider_id) = (params.slot_id, params.provider_id);

        let deleted = self
            .run(move |db| db.delete_slot(slot_id, provider_id))
            .await?;
        log::info!("Provider {provider_id} deleted slot {slot_id}");
        Ok(deleted)
    }

    /// Lists a provider's slots, optionally for one weekday.
    pub async fn list_slots(&self, params: &ListSlots) -> Result<Vec<AvailabilitySlot>> {
        let day = params.validate()?;
        let provider_id = params.provider_id;

        self.run(move |db| db.list_slots(provider_id, day)).await
    }

    /// Flips every slot on the weekday of the given date.
    ///
    /// Fails with `Overlap`, leaving every slot as it was, if two slots that
    /// would end up active overlap or touch.
    pub async fn toggle_day(&self, params: &ToggleDay) -> Result<Vec<AvailabilitySlot>> {
        let day = params.validate()?;
        let provider_id = params.provider_id;
        let now = self.now().timestamp();

        self.run(move |db| db.toggle_day(provider_id, day, now))
            .await
    }

    /// Retrieves a slot by its ID.
    pub async fn get_slot(&self, params: &Id) -> Result<AvailabilitySlot> {
        let slot_id = params.id;

        self.run(move |db| db.get_slot(slot_id))
            .await?
            .ok_or(BookingError::NotFound {
                entity: "Slot",
                id: slot_id,
            })
    }
}
