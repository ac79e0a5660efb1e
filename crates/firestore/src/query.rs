//! Structured query construction for `documents:runQuery`.

use musala_core::config::RangeMode;
use musala_mosques::{FieldRange, RangeQuery};
use serde::Serialize;

/// Body of a `runQuery` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    CompositeFilter { op: CompositeOp, filters: Vec<Filter> },
    FieldFilter { field: FieldReference, op: FieldOp, value: TypedValue },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeOp {
    And,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldOp {
    GreaterThanOrEqual,
    LessThanOrEqual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedValue {
    DoubleValue(f64),
}

fn bound(field: &str, op: FieldOp, value: f64) -> Filter {
    Filter::FieldFilter {
        field: FieldReference {
            field_path: field.to_string(),
        },
        op,
        value: TypedValue::DoubleValue(value),
    }
}

fn range_filters(range: &FieldRange) -> [Filter; 2] {
    [
        bound(&range.field, FieldOp::GreaterThanOrEqual, range.min),
        bound(&range.field, FieldOp::LessThanOrEqual, range.max),
    ]
}

/// What is sent to Firestore and what is left to check after the response.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub request: RunQueryRequest,
    /// Ranges Firestore was not asked to apply
    pub client_side: Vec<FieldRange>,
}

impl QueryPlan {
    /// `Compound` pushes every range to the server. `LatitudeOnly` sends the first
    /// range and keeps the rest for client-side filtering, which works without a
    /// composite index at the cost of fetching a wider band.
    pub fn new(query: &RangeQuery, mode: RangeMode) -> Self {
        let server_count = match mode {
            RangeMode::Compound => query.ranges.len(),
            RangeMode::LatitudeOnly => query.ranges.len().min(1),
        };
        let (server, client) = query.ranges.split_at(server_count);

        let mut filters: Vec<Filter> = server.iter().flat_map(range_filters).collect();
        let filter = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::CompositeFilter {
                op: CompositeOp::And,
                filters,
            }),
        };

        Self {
            request: RunQueryRequest {
                structured_query: StructuredQuery {
                    from: vec![CollectionSelector {
                        collection_id: query.collection.clone(),
                    }],
                    filter,
                },
            },
            client_side: client.to_vec(),
        }
    }
}
