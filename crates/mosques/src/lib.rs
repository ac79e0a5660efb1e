//! Mosque lookup for Pocket Musala.
//!
//! This crate provides:
//! - The [`Mosque`] record and its API response wrappers
//! - Tolerant decoding of loosely shaped store documents
//! - The [`DocumentStore`] seam with an in-memory implementation
//! - [`NearbySearchEngine`], which ties them to the geo primitives

pub mod decode;
pub mod engine;
mod error;
pub mod model;
pub mod store;

pub use decode::decode_mosque;
pub use engine::{NearbySearchEngine, SearchRequest};
pub use error::{Result, SearchError, SkipReason, StoreError};
pub use model::{
    AdvancedSettings, CalculationParameters, ErrorResponse, IqamahCalculationRules, IqamahRule,
    Location, Mosque, NearbyMosquesResponse, Photo, PrayerAdjustments,
};
pub use store::{DocumentStore, FieldRange, MemoryStore, RangeQuery, RawDocument};
