//! Bounding boxes around a search circle.
//!
//! A [`BoundingBox`] is the coarse pre-filter of a nearby search: an axis-aligned
//! latitude/longitude rectangle that contains the search circle, so a document store
//! can narrow candidates with plain range predicates before exact distances are
//! computed.
//!
//! The rectangle uses a flat `111 km per degree` approximation. Towards the poles
//! `cos(latitude)` approaches zero and the longitude half-width blows up; the raw box
//! is returned as computed and [`BoundingBox::query_ranges`] is where it gets folded
//! back onto the globe.

use crate::Coordinate;
use serde::{Deserialize, Serialize};

/// Kilometres per degree of latitude used by the box approximation.
pub const KM_PER_DEGREE_LAT: f64 = 111.0;

const FULL_LNG: LngRange = LngRange { min: -180.0, max: 180.0 };

/// Latitude/longitude rectangle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// An inclusive longitude interval inside [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngRange {
    pub min: f64,
    pub max: f64,
}

impl LngRange {
    /// True when the range spans every longitude.
    pub fn is_full(&self) -> bool {
        self.min <= -180.0 && self.max >= 180.0
    }

    #[inline]
    fn contains(&self, longitude: f64) -> bool {
        (self.min..=self.max).contains(&longitude)
    }
}

/// Store-ready ranges derived from a [`BoundingBox`].
///
/// Latitude is clamped to [-90, 90]. Longitude is one range, or two when the box
/// crosses the antimeridian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRanges {
    pub min_lat: f64,
    pub max_lat: f64,
    pub lng: Vec<LngRange>,
}

impl QueryRanges {
    /// Returns true if the coordinate falls inside the latitude band and any longitude range.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.latitude)
            && self.lng.iter().any(|range| range.contains(coord.longitude))
    }
}

/// Computes the rectangle around `center` that covers a circle of `radius_km`.
///
/// `radius_km` must be positive; callers validate it. The result is the plain
/// formula, including the degenerate longitude span near the poles.
///
/// # Example
/// ```
/// use musala_geo::{compute_bounding_box, Coordinate};
///
/// let bbox = compute_bounding_box(Coordinate::new(0.0, 0.0), 111.0);
/// assert!((bbox.max_lat - 1.0).abs() < 1e-12);
/// assert!((bbox.min_lng + 1.0).abs() < 1e-12);
/// ```
pub fn compute_bounding_box(center: Coordinate, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;
    let lng_delta = radius_km / (KM_PER_DEGREE_LAT * center.latitude.to_radians().cos());

    BoundingBox {
        min_lat: center.latitude - lat_delta,
        max_lat: center.latitude + lat_delta,
        min_lng: center.longitude - lng_delta,
        max_lng: center.longitude + lng_delta,
    }
}

impl BoundingBox {
    /// Returns true if the coordinate lies inside the raw rectangle (edges included).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.latitude)
            && (self.min_lng..=self.max_lng).contains(&coord.longitude)
    }

    /// Width of the rectangle in degrees of longitude.
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Folds the rectangle onto the globe for use as store range predicates.
    ///
    /// - latitude is clamped to [-90, 90]
    /// - longitude covers everything when the span is non-finite, at least 360 degrees,
    ///   or when the latitude band reaches a pole (every meridian meets there)
    /// - a span poking past +/-180 is split into two ranges
    pub fn query_ranges(&self) -> QueryRanges {
        let min_lat = self.min_lat.max(-90.0);
        let max_lat = self.max_lat.min(90.0);
        let span = self.lng_span();

        let reaches_pole = self.min_lat <= -90.0 || self.max_lat >= 90.0;

        let lng = if !span.is_finite() || span >= 360.0 || reaches_pole {
            vec![FULL_LNG]
        } else if self.min_lng < -180.0 {
            vec![
                LngRange { min: self.min_lng + 360.0, max: 180.0 },
                LngRange { min: -180.0, max: self.max_lng },
            ]
        } else if self.max_lng > 180.0 {
            vec![
                LngRange { min: self.min_lng, max: 180.0 },
                LngRange { min: -180.0, max: self.max_lng - 360.0 },
            ]
        } else {
            vec![LngRange { min: self.min_lng, max: self.max_lng }]
        };

        QueryRanges { min_lat, max_lat, lng }
    }
}
