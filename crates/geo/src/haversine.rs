//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// Plain double-precision haversine on a sphere of radius [`EARTH_RADIUS_KM`].
/// Antipodal points and longitude wraparound get no special treatment beyond
/// what the formula does on its own.
///
/// # Example
/// ```
/// use musala_geo::{haversine_distance, Coordinate};
///
/// let mecca = Coordinate::new(21.4225, 39.8262);
/// let medina = Coordinate::new(24.4672, 39.6112);
///
/// let distance = haversine_distance(&mecca, &medina);
/// assert!((distance - 339.0).abs() < 5.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Coordinate = Coordinate { latitude: 51.5074, longitude: -0.1278 };
    const ISTANBUL: Coordinate = Coordinate { latitude: 41.0082, longitude: 28.9784 };
    const JAKARTA: Coordinate = Coordinate { latitude: -6.2088, longitude: 106.8456 };
    const ORIGIN: Coordinate = Coordinate { latitude: 0.0, longitude: 0.0 };

    #[test]
    fn test_london_to_istanbul() {
        let distance = haversine_distance(&LONDON, &ISTANBUL);
        // Expected: ~2,500 km
        assert!((distance - 2500.0).abs() < 20.0, "London-Istanbul: {}", distance);
    }

    #[test]
    fn test_small_offset_on_equator() {
        // 0.05 degrees of longitude on the equator
        let distance = haversine_distance(&ORIGIN, &Coordinate::new(0.0, 0.05));
        assert!((distance - 5.5597).abs() < 0.001, "got {}", distance);
    }

    #[test]
    fn test_one_degree_on_equator() {
        let distance = haversine_distance(&ORIGIN, &Coordinate::new(0.0, 1.0));
        assert!((distance - 111.19).abs() < 0.01, "got {}", distance);
    }

    #[test]
    fn test_same_point_zero_distance() {
        let distance = haversine_distance(&JAKARTA, &JAKARTA);
        assert!(distance.abs() < 0.001);
    }

    #[test]
    fn test_symmetry() {
        let d1 = haversine_distance(&LONDON, &JAKARTA);
        let d2 = haversine_distance(&JAKARTA, &LONDON);
        assert!((d1 - d2).abs() < 0.001);
    }

    #[test]
    fn test_antipodal_points_half_circumference() {
        let distance = haversine_distance(&ORIGIN, &Coordinate::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((distance - half_circumference).abs() < 0.001);
    }

    #[test]
    fn test_wraparound_across_antimeridian() {
        let west = Coordinate::new(0.0, 179.95);
        let east = Coordinate::new(0.0, -179.95);
        let distance = haversine_distance(&west, &east);
        assert!((distance - 11.12).abs() < 0.01, "got {}", distance);
    }
}
