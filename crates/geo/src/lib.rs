//! Geospatial primitives for the Pocket Musala nearby search.
//!
//! This crate provides:
//! - Haversine great-circle distance
//! - Bounding boxes that over-approximate a search circle, plus the store-ready
//!   ranges derived from them
//! - Radius filtering and distance ranking over arbitrary located items
//!
//! # Example
//!
//! ```
//! use musala_geo::{compute_bounding_box, haversine_distance, Coordinate};
//!
//! let center = Coordinate::new(0.0, 0.0);
//! let candidate = Coordinate::new(0.0, 0.05);
//!
//! let bbox = compute_bounding_box(center, 10.0);
//! assert!(bbox.contains(&candidate));
//!
//! let distance_km = haversine_distance(&center, &candidate);
//! assert!((distance_km - 5.56).abs() < 0.05);
//! ```

mod bbox;
mod error;
mod haversine;
pub mod batch;

pub use batch::{rank_within_radius, Located, Ranked};
pub use bbox::{compute_bounding_box, BoundingBox, LngRange, QueryRanges, KM_PER_DEGREE_LAT};
pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{haversine_distance, EARTH_RADIUS_KM};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without range checks.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside [-90, 90] x [-180, 180]"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    ///
    /// NaN fails every comparison, so non-finite input is rejected too.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}
