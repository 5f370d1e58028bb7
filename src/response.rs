//! Store API response envelope.

use serde::Serialize;
use serde_json::{Map, Value};

/// `{ total, aggregations, elements }`
#[derive(Debug, Serialize)]
pub struct ListingResponse<T> {
    pub total: u64,
    pub aggregations: Map<String, Value>,
    pub elements: Vec<T>,
}

impl<T> From<crate::repository::EntitySearchResult<T>> for ListingResponse<T> {
    fn from(result: crate::repository::EntitySearchResult<T>) -> Self {
        ListingResponse {
            total: result.total,
            aggregations: result.aggregations,
            elements: result.elements,
        }
    }
}
