//! Nearby search: bounding box, range query, tolerant decode, exact filter, sort.

use crate::decode::decode_mosque;
use crate::error::Result;
use crate::model::Mosque;
use crate::store::{DocumentStore, RangeQuery, LATITUDE_FIELD, LONGITUDE_FIELD};
use musala_core::config::SearchConfig;
use musala_geo::{compute_bounding_box, rank_within_radius, Coordinate, GeoError, Ranked};
use std::collections::HashSet;
use tracing::{debug, error, info, instrument};

/// A validated search: center inside the globe, radius in `(0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub center: Coordinate,
    pub radius_km: f64,
}

impl SearchRequest {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64, max_radius_km: f64) -> Result<Self> {
        let center = Coordinate::try_new(latitude, longitude)?;
        if !(radius_km > 0.0 && radius_km <= max_radius_km) {
            return Err(GeoError::InvalidRadius(format!(
                "{radius_km} km is outside (0, {max_radius_km}]"
            ))
            .into());
        }
        Ok(Self { center, radius_km })
    }
}

/// Finds mosques around a point using a [`DocumentStore`].
///
/// Stateless between calls: every search re-queries the store.
#[derive(Debug, Clone)]
pub struct NearbySearchEngine<S> {
    store: S,
    config: SearchConfig,
}

impl<S: DocumentStore> NearbySearchEngine<S> {
    pub fn new(store: S, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store queries covering the circle: one per longitude range of the box.
    pub fn range_queries(&self, center: Coordinate, radius_km: f64) -> Vec<RangeQuery> {
        let ranges = compute_bounding_box(center, radius_km).query_ranges();

        ranges
            .lng
            .iter()
            .map(|lng| {
                RangeQuery::new(&self.config.collection_name)
                    .with_range(LATITUDE_FIELD, ranges.min_lat, ranges.max_lat)
                    .with_range(LONGITUDE_FIELD, lng.min, lng.max)
            })
            .collect()
    }

    /// Mosques within `radius_km` of `center`, nearest first, with distances.
    ///
    /// Undecodable records are skipped. A store failure fails the whole search.
    #[instrument(skip(self), fields(collection = %self.config.collection_name, store = self.store.name()))]
    pub async fn find_nearby_ranked(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Ranked<Mosque>>> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut fetched = 0usize;

        for query in self.range_queries(center, radius_km) {
            let docs = self.store.range_query(&query).await?;
            fetched += docs.len();

            for doc in docs {
                if !seen.insert(doc.id.clone()) {
                    continue;
                }
                match decode_mosque(&doc) {
                    Ok(mosque) => candidates.push(mosque),
                    Err(reason) => debug!(id = %doc.id, %reason, "Skipping record"),
                }
            }
        }

        let ranked = rank_within_radius(&center, radius_km, candidates);
        info!(fetched, matched = ranked.len(), "Nearby search complete");
        Ok(ranked)
    }

    /// Mosques within `radius_km` of `center`, nearest first.
    pub async fn find_nearby(&self, center: Coordinate, radius_km: f64) -> Result<Vec<Mosque>> {
        let ranked = self.find_nearby_ranked(center, radius_km).await?;
        Ok(ranked.into_iter().map(Ranked::into_inner).collect())
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Mosque>> {
        self.find_nearby(request.center, request.radius_km).await
    }

    /// Never fails: any error is logged and reported as no results.
    ///
    /// Callers cannot tell "nothing nearby" from "store unreachable"; use
    /// [`find_nearby`](Self::find_nearby) when that matters.
    pub async fn find_nearby_mosques(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Vec<Mosque> {
        match self.find_nearby(Coordinate::new(latitude, longitude), radius_km).await {
            Ok(mosques) => mosques,
            Err(e) => {
                error!(error = %e, latitude, longitude, radius_km, "Nearby search failed");
                Vec::new()
            }
        }
    }
}
