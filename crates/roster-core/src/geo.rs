//! Great-circle distance and nearest-first ordering.

use serde::{Deserialize, Serialize};

use crate::models::GeoPoint;

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// An item annotated with its distance from the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Orders items nearest first.
///
/// Items without a location are dropped, as are items beyond `radius_km`.
/// Equal distances keep their input order.
pub fn rank_by_distance<T, F>(
    origin: GeoPoint,
    items: Vec<T>,
    location_of: F,
    radius_km: Option<f64>,
) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> Option<GeoPoint>,
{
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .filter_map(|item| {
            let distance_km = distance_km(origin, location_of(&item)?);
            Some(Ranked { item, distance_km })
        })
        .filter(|r| radius_km.map_or(true, |radius| r.distance_km <= radius))
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
