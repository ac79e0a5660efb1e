//! Radius filtering and distance ranking over batches of located items.
//!
//! This is the exact second phase of a nearby search: candidates that survived the
//! bounding-box pre-filter are measured with haversine, anything beyond the radius
//! is dropped, and the rest is ordered nearest first.

use crate::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};

/// Anything with a position on the globe.
pub trait Located {
    /// The point distances are measured to.
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    #[inline]
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    #[inline]
    fn coordinate(&self) -> Coordinate {
        (**self).coordinate()
    }
}

/// An item paired with its distance from the search center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    /// The ranked item
    pub item: T,
    /// Great-circle distance from the center in kilometers
    pub distance_km: f64,
}

impl<T> Ranked<T> {
    /// Drops the distance and returns the item.
    pub fn into_inner(self) -> T {
        self.item
    }
}

/// Keeps the items within `radius_km` of `center` and sorts them nearest first.
///
/// The boundary is inclusive: an item exactly `radius_km` away is kept. The sort is
/// stable, so items at equal distance keep their input order. Items whose distance
/// is NaN are never within the radius and are dropped.
///
/// # Example
/// ```
/// use musala_geo::{rank_within_radius, Coordinate};
///
/// let center = Coordinate::new(0.0, 0.0);
/// let points = vec![
///     Coordinate::new(0.0, 0.08),
///     Coordinate::new(0.0, 1.0),
///     Coordinate::new(0.0, 0.02),
/// ];
///
/// let ranked = rank_within_radius(&center, 10.0, points);
/// assert_eq!(ranked.len(), 2);
/// assert_eq!(ranked[0].item, Coordinate::new(0.0, 0.02));
/// ```
pub fn rank_within_radius<T, I>(center: &Coordinate, radius_km: f64, items: I) -> Vec<Ranked<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .filter_map(|item| {
            let distance_km = haversine_distance(center, &item.coordinate());
            (distance_km <= radius_km).then_some(Ranked { item, distance_km })
        })
        .collect();

    // `sort_by` is stable; ties keep input order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Place {
        name: &'static str,
        at: Coordinate,
    }

    impl Located for Place {
        fn coordinate(&self) -> Coordinate {
            self.at
        }
    }

    fn place(name: &'static str, lat: f64, lng: f64) -> Place {
        Place { name, at: Coordinate::new(lat, lng) }
    }

    #[test]
    fn test_filters_outside_radius() {
        let center = Coordinate::new(0.0, 0.0);
        let places = vec![place("near", 0.0, 0.05), place("far", 0.0, 1.0)];

        let ranked = rank_within_radius(&center, 10.0, places);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.name, "near");
        assert!((ranked[0].distance_km - 5.56).abs() < 0.01);
    }

    #[test]
    fn test_sorted_ascending() {
        let center = Coordinate::new(0.0, 0.0);
        let places = vec![
            place("c", 0.0, 0.07),
            place("a", 0.01, 0.0),
            place("b", 0.0, -0.03),
        ];

        let ranked = rank_within_radius(&center, 10.0, places);
        let names: Vec<_> = ranked.iter().map(|r| r.item.name).collect();

        assert_eq!(names, vec!["a", "b", "c"]);
        for window in ranked.windows(2) {
            assert!(window[0].distance_km <= window[1].distance_km);
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let center = Coordinate::new(0.0, 0.0);
        let edge = Coordinate::new(0.0, 0.05);
        let radius = haversine_distance(&center, &edge);

        let ranked = rank_within_radius(&center, radius, vec![edge]);

        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let center = Coordinate::new(0.0, 0.0);
        let places = vec![
            place("east", 0.0, 0.03),
            place("west", 0.0, -0.03),
            place("closer", 0.0, 0.01),
        ];

        let ranked = rank_within_radius(&center, 10.0, places);
        let names: Vec<_> = ranked.iter().map(|r| r.item.name).collect();

        assert_eq!(names, vec!["closer", "east", "west"]);
    }

    #[test]
    fn test_nan_location_dropped() {
        let center = Coordinate::new(0.0, 0.0);
        let ranked = rank_within_radius(&center, 10.0, vec![Coordinate::new(f64::NAN, 0.0)]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_works_with_references() {
        let center = Coordinate::new(0.0, 0.0);
        let places = [place("near", 0.0, 0.05)];

        let ranked = rank_within_radius(&center, 10.0, places.iter());

        assert_eq!(ranked.len(), 1);
        let first: &Place = ranked.into_iter().next().unwrap().into_inner();
        assert_eq!(first.name, "near");
    }
}
