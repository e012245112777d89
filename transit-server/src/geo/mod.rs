//! Geographic search over named points.
//!
//! Great-circle distances use the Haversine formula on a spherical Earth.
//! Nearest-point search is a brute-force scan: the point sets are a few
//! dozen bus stands and railway stations, so no spatial index is needed.

mod coordinates;
mod distance;
mod nearest;
mod point;

pub use coordinates::{Coordinates, InvalidCoordinates};
pub use distance::{EARTH_RADIUS_KM, distance_km};
pub use nearest::{DEFAULT_NEAREST_LIMIT, Nearby, nearest};
pub use point::LocationPoint;
