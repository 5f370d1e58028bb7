//! Blog listing handler: reads `search`, paging and aggregations from the query string
//! or JSON body and hands them to the blog route.

use crate::context::SalesChannelContext;
use crate::criteria::{Aggregation, AggregationKind, Criteria};
use crate::entity::BlogEntry;
use crate::error::AppError;
use crate::response::ListingResponse;
use crate::service::BlogRequest;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn body_to_map(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
        Err(e) => Err(AppError::BadRequest(format!("invalid JSON body: {}", e))),
    }
}

/// Query string wins over the body.
fn param(query: &HashMap<String, String>, body: &Map<String, Value>, key: &str) -> Option<Value> {
    query
        .get(key)
        .map(|s| Value::String(s.clone()))
        .or_else(|| body.get(key).filter(|v| !v.is_null()).cloned())
}

fn positive_int(key: &str, value: &Value) -> Result<u32, AppError> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    n.filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| AppError::BadRequest(format!("{} must be a positive integer", key)))
}

fn parse_aggregation(value: &Value) -> Result<Aggregation, AppError> {
    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("aggregation requires a string {}", key)))
    };
    let kind = match text("type")?.as_str() {
        "count" => AggregationKind::Count,
        "terms" => AggregationKind::Terms,
        other => return Err(AppError::BadRequest(format!("unsupported aggregation type {}", other))),
    };
    Ok(Aggregation {
        name: text("name")?,
        kind,
        field: text("field")?,
    })
}

/// Translate request parameters into the route input and the base criteria.
pub fn listing_request(
    query: &HashMap<String, String>,
    body: &Map<String, Value>,
    max_limit: u32,
) -> Result<(BlogRequest, Criteria), AppError> {
    let search = match param(query, body, "search") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(_) => return Err(AppError::BadRequest("search must be a string".into())),
        None => None,
    };

    let limit = param(query, body, "limit")
        .map(|v| positive_int("limit", &v))
        .transpose()?
        .map_or(max_limit, |n| n.min(max_limit));
    let page = param(query, body, "page")
        .map(|v| positive_int("page", &v))
        .transpose()?
        .unwrap_or(1);
    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::BadRequest("page out of range".into()))?;

    let mut criteria = Criteria::new();
    criteria.set_limit(Some(limit)).set_offset(Some(offset));
    match body.get("aggregations") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                criteria.add_aggregation(parse_aggregation(item)?);
            }
        }
        Some(_) => return Err(AppError::BadRequest("aggregations must be an array".into())),
    }

    Ok((BlogRequest { search }, criteria))
}

/// GET|POST /store-api/blog
pub async fn list_blog(
    State(state): State<AppState>,
    context: SalesChannelContext,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<ListingResponse<BlogEntry>>, AppError> {
    let body = body_to_map(&body)?;
    let (request, criteria) = listing_request(&query, &body, state.settings.max_limit)?;
    let result = state.blog_route.load(&request, criteria, &context).await?;
    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn query_search_takes_precedence_over_body() {
        let (request, _) = listing_request(
            &query(&[("search", "from-query")]),
            &object(json!({ "search": "from-body" })),
            100,
        )
        .unwrap();
        assert_eq!(request.search.as_deref(), Some("from-query"));

        let (request, _) = listing_request(&query(&[]), &object(json!({ "search": "from-body" })), 100).unwrap();
        assert_eq!(request.search.as_deref(), Some("from-body"));
    }

    #[test]
    fn paging_defaults_and_caps() {
        let (_, c) = listing_request(&query(&[]), &Map::new(), 50).unwrap();
        assert_eq!((c.limit(), c.offset()), (Some(50), Some(0)));

        let (_, c) = listing_request(&query(&[("limit", "500"), ("page", "2")]), &Map::new(), 50).unwrap();
        assert_eq!((c.limit(), c.offset()), (Some(50), Some(50)));

        let (_, c) = listing_request(&query(&[]), &object(json!({ "limit": 2, "page": 3 })), 50).unwrap();
        assert_eq!((c.limit(), c.offset()), (Some(2), Some(4)));
    }

    #[test]
    fn rejects_malformed_paging() {
        for (k, v) in [("limit", "abc"), ("limit", "0"), ("page", "-1")] {
            let err = listing_request(&query(&[(k, v)]), &Map::new(), 100).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{}={}", k, v);
        }
    }

    #[test]
    fn parses_aggregations() {
        let body = object(json!({
            "aggregations": [
                { "name": "authors", "type": "terms", "field": "authorId" },
                { "name": "n", "type": "count", "field": "id" }
            ]
        }));
        let (_, c) = listing_request(&query(&[]), &body, 100).unwrap();
        assert_eq!(c.aggregations().len(), 2);
        assert_eq!(c.aggregations()[0].kind, AggregationKind::Terms);
        assert_eq!(c.aggregations()[1].field, "id");

        let bad = object(json!({ "aggregations": [{ "name": "x", "type": "avg", "field": "id" }] }));
        assert!(matches!(listing_request(&query(&[]), &bad, 100), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(body_to_map(b"").unwrap().is_empty());
        assert!(body_to_map(b"  \n").unwrap().is_empty());
        assert!(matches!(body_to_map(b"[1]"), Err(AppError::BadRequest(_))));
        assert!(matches!(body_to_map(b"{"), Err(AppError::BadRequest(_))));
    }
}
