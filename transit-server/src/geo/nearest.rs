//! k-nearest selection over a point list.

use serde::Serialize;

use super::{Coordinates, LocationPoint, distance_km};

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_NEAREST_LIMIT: usize = 5;

/// A point together with its distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nearby<'a> {
    pub point: &'a LocationPoint,
    pub distance_km: f64,
}

/// Find the `limit` points closest to `origin`.
///
/// Results are ordered by ascending distance. Points at equal distance keep
/// their input order. If `limit` exceeds the number of points, every point
/// is returned; an empty input gives an empty result.
pub fn nearest<'a>(origin: Coordinates, points: &'a [LocationPoint], limit: usize) -> Vec<Nearby<'a>> {
    let mut ranked: Vec<Nearby<'a>> = points
        .iter()
        .map(|point| Nearby {
            point,
            distance_km: distance_km(origin, point.coordinates()),
        })
        .collect();

    // sort_by is stable, which gives the input-order tie break
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}
