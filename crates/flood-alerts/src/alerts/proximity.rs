use serde::Serialize;

use crate::geo::{haversine_km, Coordinates};

/// Radius for matching emergency centers to a citizen report.
pub const CENTER_RADIUS_KM: f64 = 10.0;
/// Radius for matching alert subscribers to a flood event.
pub const SUBSCRIBER_RADIUS_KM: f64 = 20.0;
/// Cap on nearby shelters/centers returned to callers.
pub const MAX_NEARBY: usize = 3;

/// A candidate annotated with its distance from the anchor point.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance_km: f64,
}

fn rank<T>(anchor: Coordinates, items: Vec<T>, coords: impl Fn(&T) -> Coordinates) -> Vec<Ranked<T>> {
    items
        .into_iter()
        .map(|item| {
            let distance_km = haversine_km(anchor, coords(&item));
            Ranked { item, distance_km }
        })
        .collect()
}

/// Shelter policy: every candidate ranked ascending by distance, first
/// `limit` kept, no distance cutoff. Ties keep input order (stable sort).
pub fn nearest<T>(
    anchor: Coordinates,
    items: Vec<T>,
    coords: impl Fn(&T) -> Coordinates,
    limit: usize,
) -> Vec<Ranked<T>> {
    let mut ranked = rank(anchor, items, coords);
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}

/// Radius policy: candidates within `radius_km` inclusive, input order
/// preserved.
pub fn within_radius<T>(
    anchor: Coordinates,
    items: Vec<T>,
    coords: impl Fn(&T) -> Coordinates,
    radius_km: f64,
) -> Vec<Ranked<T>> {
    rank(anchor, items, coords)
        .into_iter()
        .filter(|ranked| ranked.distance_km <= radius_km)
        .collect()
}

/// Radius policy with the center flow's ascending sort and cap.
pub fn nearest_within<T>(
    anchor: Coordinates,
    items: Vec<T>,
    coords: impl Fn(&T) -> Coordinates,
    radius_km: f64,
    limit: usize,
) -> Vec<Ranked<T>> {
    let mut ranked = within_radius(anchor, items, coords, radius_km);
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}
