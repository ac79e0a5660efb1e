//! The document store seam.
//!
//! The search engine only needs one capability from persistence: "give me the
//! documents whose numeric fields fall inside these ranges". [`DocumentStore`]
//! captures that; [`MemoryStore`] is the in-process implementation used for local
//! runs and tests.

use crate::error::StoreError;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Dotted path of the latitude field inside a mosque document.
pub const LATITUDE_FIELD: &str = "location.latitude";
/// Dotted path of the longitude field inside a mosque document.
pub const LONGITUDE_FIELD: &str = "location.longitude";

/// An inclusive numeric range on one (possibly nested) field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRange {
    pub field: String,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn new(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            field: field.into(),
            min,
            max,
        }
    }

    /// A document matches only if the field exists and is a number in range.
    pub fn matches(&self, doc: &RawDocument) -> bool {
        doc.field_f64(&self.field)
            .is_some_and(|value| (self.min..=self.max).contains(&value))
    }
}

/// A conjunction of field ranges over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub collection: String,
    pub ranges: Vec<FieldRange>,
}

impl RangeQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ranges: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_range(mut self, field: impl Into<String>, min: f64, max: f64) -> Self {
        self.ranges.push(FieldRange::new(field, min, max));
        self
    }

    /// True when every range matches.
    pub fn matches(&self, doc: &RawDocument) -> bool {
        self.ranges.iter().all(|range| range.matches(doc))
    }
}

/// A stored document: its id plus the untyped field map.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub data: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Looks up a dotted path such as `location.latitude`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.data.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.as_object()?.get(key))
    }

    pub fn field_f64(&self, path: &str) -> Option<f64> {
        self.field(path).and_then(Value::as_f64)
    }
}

/// Range-query access to a document collection.
///
/// Implementations return matching documents in a stable order and report
/// failures as [`StoreError`]; they never partially succeed.
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;

    fn range_query(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send;
}

impl<S: DocumentStore> DocumentStore for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn range_query(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send {
        (**self).range_query(query)
    }
}

/// In-process store; scans the collection and filters every range itself.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<RawDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document; insertion order is the order queries return.
    pub fn insert(&mut self, collection: impl Into<String>, doc: RawDocument) {
        self.collections.entry(collection.into()).or_default().push(doc);
    }

    #[must_use]
    pub fn with_document(mut self, collection: &str, id: &str, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.insert(collection, RawDocument::new(id, data));
        self
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }

    /// Builds a store from seed JSON.
    ///
    /// Accepts either an array of objects each carrying a string `id` (removed
    /// from the stored data) with no id repeated, or an object mapping ids to documents.
    pub fn from_json_str(collection: &str, json: &str) -> Result<Self, StoreError> {
        let seed: Value =
            serde_json::from_str(json).map_err(|e| StoreError::Seed(e.to_string()))?;

        let mut store = Self::new();
        match seed {
            Value::Array(items) => {
                let mut seen = HashSet::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let Value::Object(mut data) = item else {
                        return Err(StoreError::Seed(format!("entry {index} is not an object")));
                    };
                    let id = match data.remove("id") {
                        Some(Value::String(id)) => id,
                        _ => return Err(StoreError::Seed(format!("entry {index} has no string id"))),
                    };
                    if !seen.insert(id.clone()) {
                        return Err(StoreError::Seed(format!("entry {index} repeats document id '{id}'")));
                    }
                    store.insert(collection, RawDocument::new(id, data));
                }
            }
            Value::Object(entries) => {
                for (id, item) in entries {
                    let Value::Object(data) = item else {
                        return Err(StoreError::Seed(format!("document '{id}' is not an object")));
                    };
                    store.insert(collection, RawDocument::new(id, data));
                }
            }
            _ => return Err(StoreError::Seed("expected a JSON array or object".to_string())),
        }

        debug!(collection, documents = store.len(collection), "Seeded memory store");
        Ok(store)
    }

    pub fn from_seed_file(collection: &str, path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_json_str(collection, &json)
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn range_query(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send {
        let matched: Vec<RawDocument> = self
            .collections
            .get(&query.collection)
            .map(|docs| docs.iter().filter(|doc| query.matches(doc)).cloned().collect())
            .unwrap_or_default();
        std::future::ready(Ok(matched))
    }
}
