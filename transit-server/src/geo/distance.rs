//! Haversine great-circle distance.

use super::Coordinates;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres.
///
/// Uses the Haversine formula with a spherical Earth of radius
/// [`EARTH_RADIUS_KM`]. The result is symmetric in its arguments and zero
/// for identical points.
///
/// # Examples
///
/// ```
/// use transit_server::geo::{Coordinates, distance_km};
///
/// let colombo = Coordinates::new(6.9368, 79.8474).unwrap();
/// let kandy = Coordinates::new(7.2949, 80.6352).unwrap();
///
/// let d = distance_km(colombo, kandy);
/// assert!((d - 95.61).abs() < 0.01);
/// ```
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push h marginally above 1 for antipodal points.
    let h = h.min(1.0);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn same_point_is_zero() {
        let fort = at(6.9368, 79.8474);
        assert_eq!(distance_km(fort, fort), 0.0);
    }

    #[test]
    fn colombo_to_kandy() {
        let d = distance_km(at(6.9368, 79.8474), at(7.2949, 80.6352));
        assert!((d - 95.61).abs() < 0.01, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_km(at(0.0, 0.0), at(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.001, "got {d}");
    }

    #[test]
    fn half_circumference_along_equator() {
        let d = distance_km(at(0.0, 0.0), at(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = distance_km(at(45.0, 30.0), at(-45.0, -150.0));
        assert!(d.is_finite());
    }

    #[test]
    fn crosses_antimeridian() {
        // 179.5E to 179.5W is one degree of longitude, not 359.
        let d = distance_km(at(0.0, 179.5), at(0.0, -179.5));
        assert!((d - 111.195).abs() < 0.001, "got {d}");
    }
}
