//! Firestore typed values to plain JSON.
//!
//! The REST API wraps every value in a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"mapValue": {"fields": {...}}}`). Documents are
//! flattened to ordinary JSON so the tolerant decoder can read them the same way
//! regardless of the backend.

use crate::error::{FirestoreError, FirestoreResult};
use musala_mosques::RawDocument;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

/// A document as it appears in API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// `projects/{p}/databases/{d}/documents/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Last path segment of the resource name.
    pub fn id(&self) -> FirestoreResult<&str> {
        self.name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FirestoreError::Decode(format!("document name '{}' has no id", self.name)))
    }

    pub fn into_raw(self) -> FirestoreResult<RawDocument> {
        let id = self.id()?.to_string();
        Ok(RawDocument::new(id, decode_fields(&self.fields)))
    }
}

/// Decodes a `fields` map.
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decodes one typed value. Unknown or malformed wrappers become `null`, which
/// the mosque decoder treats like a missing field.
pub fn decode_value(typed: &Value) -> Value {
    let Some((kind, inner)) = typed.as_object().and_then(|obj| obj.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.as_bool().map_or(Value::Null, Value::Bool),
        // int64 travels as a decimal string
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map_or(Value::Null, Value::from),
            Value::Number(n) => Value::Number(n.clone()),
            _ => Value::Null,
        },
        // NaN and the infinities arrive as strings and have no JSON form
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => match inner {
            Value::String(s) => Value::String(s.clone()),
            _ => Value::Null,
        },
        "geoPointValue" => {
            let mut point = Map::new();
            for key in ["latitude", "longitude"] {
                let coordinate = inner.get(key).and_then(Value::as_f64).unwrap_or(0.0);
                point.insert(key.to_string(), Value::from(coordinate));
            }
            Value::Object(point)
        }
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        other => {
            debug!(kind = other, "Unknown Firestore value type");
            Value::Null
        }
    }
}
