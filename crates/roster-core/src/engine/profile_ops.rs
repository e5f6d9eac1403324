//! Profile and nearby-provider operations for the BookingEngine.

use super::BookingEngine;
use crate::{
    error::{BookingError, Result},
    geo::{self, Ranked},
    models::Profile,
    params::{Id, NearbyProviders, UpsertProfile},
};

impl BookingEngine {
    /// Creates or replaces a profile.
    pub async fn upsert_profile(&self, params: &UpsertProfile) -> Result<Profile> {
        let update = params.validate()?;
        let ts = self.now().timestamp();

        self.run(move |db| db.upsert_profile(&update, ts)).await
    }

    /// Retrieves a profile by its ID.
    pub async fn get_profile(&self, params: &Id) -> Result<Profile> {
        let id = params.id;

        self.run(move |db| db.get_profile(id))
            .await?
            .ok_or(BookingError::NotFound {
                entity: "Profile",
                id,
            })
    }

    /// Bookable providers nearest to a point.
    ///
    /// Only providers with a location and at least one active slot are
    /// ranked. Equal distances are ordered by provider id.
    pub async fn nearby_providers(&self, params: &NearbyProviders) -> Result<Vec<Ranked<Profile>>> {
        let origin = params.validate()?;
        let (radius_km, limit) = (params.radius_km, params.limit);

        let providers = self.run(|db| db.located_providers()).await?;
        let mut ranked = geo::rank_by_distance(origin, providers, |p| p.location, radius_km);
        if let Some(limit) = limit {
            ranked.truncate(limit as usize);
        }
        Ok(ranked)
    }
}
