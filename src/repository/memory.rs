//! In-memory repository evaluating criteria over JSON records.
//! Records are stored with resolved translations and any associations already embedded;
//! every search is logged so callers can assert how often the data layer was hit.

use crate::context::SalesChannelContext;
use crate::criteria::{AggregationKind, Criteria, Filter};
use crate::error::AppError;
use crate::repository::{EntityRepository, EntitySearchResult};
use crate::schema::{EntityDefinition, ScalarType, SortDirection};
use crate::sql::PgBindValue;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

pub struct InMemoryRepository<E> {
    definition: Arc<EntityDefinition>,
    records: Vec<Value>,
    searches: Mutex<Vec<Criteria>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Serialize> InMemoryRepository<E> {
    pub fn new(definition: Arc<EntityDefinition>, records: Vec<E>) -> Result<Self, AppError> {
        let records = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InMemoryRepository {
            definition,
            records,
            searches: Mutex::new(Vec::new()),
            _entity: PhantomData,
        })
    }
}

impl<E> InMemoryRepository<E> {
    /// Criteria of every search run so far, oldest first.
    pub fn searches(&self) -> Vec<Criteria> {
        self.searches.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().map(|s| s.len()).unwrap_or_default()
    }

    fn field_type(&self, property: &str) -> Result<ScalarType, AppError> {
        self.definition
            .field(property)
            .and_then(|f| f.scalar_type())
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "{} has no filterable field {}",
                    self.definition.entity_name, property
                ))
            })
    }

    fn record_value(&self, record: &Value, property: &str, ty: ScalarType) -> PgBindValue {
        let raw = record.get(property).unwrap_or(&Value::Null);
        PgBindValue::for_type(property, ty, raw).unwrap_or(PgBindValue::Null)
    }

    fn matches(&self, record: &Value, criteria: &Criteria) -> Result<bool, AppError> {
        if let Some(ids) = criteria.ids() {
            let wanted = ids
                .iter()
                .map(|id| PgBindValue::for_type("id", ScalarType::Uuid, &Value::String(id.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            if !wanted.contains(&self.record_value(record, "id", ScalarType::Uuid)) {
                return Ok(false);
            }
        }
        for filter in criteria.filters() {
            let ty = self.field_type(filter.field())?;
            let actual = self.record_value(record, filter.field(), ty);
            let hit = match filter {
                Filter::Equals { field, value } => PgBindValue::for_type(field, ty, value)? == actual,
                Filter::EqualsAny { field, values } => {
                    let mut any = false;
                    for v in values {
                        any |= PgBindValue::for_type(field, ty, v)? == actual;
                    }
                    any && actual != PgBindValue::Null
                }
            };
            if !hit {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn sort(&self, records: &mut [&Value]) {
        let sort = self
            .definition
            .default_sort
            .as_ref()
            .and_then(|(p, d)| self.field_type(p).ok().map(|ty| (p.as_str(), ty, *d)));
        records.sort_by(|a, b| {
            let primary = match sort {
                Some((p, ty, dir)) => {
                    let o = cmp_bind(&self.record_value(a, p, ty), &self.record_value(b, p, ty));
                    if dir == SortDirection::Desc {
                        o.reverse()
                    } else {
                        o
                    }
                }
                None => Ordering::Equal,
            };
            primary.then_with(|| {
                cmp_bind(
                    &self.record_value(a, "id", ScalarType::Uuid),
                    &self.record_value(b, "id", ScalarType::Uuid),
                )
            })
        });
    }
}

fn cmp_bind(a: &PgBindValue, b: &PgBindValue) -> Ordering {
    use PgBindValue::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Less,
        (_, Null) => Ordering::Greater,
        (Bool(x), Bool(y)) => x.cmp(y),
        (I64(x), I64(y)) => x.cmp(y),
        (String(x), String(y)) => x.cmp(y),
        (Uuid(x), Uuid(y)) => x.cmp(y),
        (Timestamp(x), Timestamp(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Bucket key in the shape the PostgreSQL repository decodes it.
fn bind_to_json(v: &PgBindValue) -> Value {
    match v {
        PgBindValue::Null => Value::Null,
        PgBindValue::Bool(b) => Value::Bool(*b),
        PgBindValue::I64(n) => Value::Number((*n).into()),
        PgBindValue::String(s) => Value::String(s.clone()),
        PgBindValue::Uuid(u) => Value::String(u.to_string()),
        PgBindValue::Timestamp(t) => Value::String(t.to_rfc3339()),
        PgBindValue::Json(j) => Value::String(j.to_string()),
    }
}

#[async_trait]
impl<E> EntityRepository<E> for InMemoryRepository<E>
where
    E: DeserializeOwned + Send + 'static,
{
    async fn search(
        &self,
        criteria: &Criteria,
        _context: &SalesChannelContext,
    ) -> Result<EntitySearchResult<E>, AppError> {
        if let Ok(mut log) = self.searches.lock() {
            log.push(criteria.clone());
        }

        let mut matched = Vec::new();
        for record in &self.records {
            if self.matches(record, criteria)? {
                matched.push(record);
            }
        }
        self.sort(&mut matched);

        let mut aggregations = Map::new();
        for aggregation in criteria.aggregations() {
            let ty = self.field_type(&aggregation.field)?;
            let values: Vec<PgBindValue> = matched
                .iter()
                .map(|r| self.record_value(r, &aggregation.field, ty))
                .filter(|v| *v != PgBindValue::Null)
                .collect();
            let value = match aggregation.kind {
                AggregationKind::Count => json!({ "count": values.len() }),
                AggregationKind::Terms => {
                    let mut counts: Vec<(PgBindValue, u64)> = Vec::new();
                    for v in values {
                        match counts.iter_mut().find(|(key, _)| *key == v) {
                            Some((_, n)) => *n += 1,
                            None => counts.push((v, 1)),
                        }
                    }
                    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| cmp_bind(&a.0, &b.0)));
                    let buckets: Vec<Value> = counts
                        .iter()
                        .map(|(key, count)| json!({ "key": bind_to_json(key), "count": count }))
                        .collect();
                    json!({ "buckets": buckets })
                }
            };
            aggregations.insert(aggregation.name.clone(), value);
        }

        let total = matched.len() as u64;
        let offset = criteria.offset().unwrap_or(0) as usize;
        let limit = criteria.limit().map(|n| n as usize).unwrap_or(usize::MAX);
        let elements = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| serde_json::from_value(r.clone()))
            .collect::<Result<Vec<E>, _>>()?;

        Ok(EntitySearchResult {
            total,
            aggregations,
            elements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Aggregation;

    fn blog_entries() -> InMemoryRepository<Value> {
        let registry = crate::schema::registry().unwrap();
        let def = registry.get(crate::schema::blog::BLOG_ENTRIES).unwrap().clone();
        let author = uuid::Uuid::new_v4().to_string();
        let records = ["2026-01-01T10:00:00Z", "2026-01-01T10:00:00Z", "2026-02-01T10:00:00+02:00"]
            .iter()
            .map(|at| {
                json!({
                    "id": uuid::Uuid::new_v4(),
                    "active": true,
                    "authorId": author,
                    "cmsPageId": author,
                    "cmsPageVersionId": author,
                    "publishedAt": at,
                })
            })
            .collect();
        InMemoryRepository::new(def, records).unwrap()
    }

    #[tokio::test]
    async fn timestamp_terms_use_rfc3339_utc_keys() {
        let repo = blog_entries();
        let mut criteria = Criteria::new();
        criteria.add_aggregation(Aggregation {
            name: "published".into(),
            kind: AggregationKind::Terms,
            field: "publishedAt".into(),
        });
        let result: EntitySearchResult<Value> =
            repo.search(&criteria, &SalesChannelContext::default()).await.unwrap();
        assert_eq!(
            result.aggregations["published"],
            json!({ "buckets": [
                { "key": "2026-01-01T10:00:00+00:00", "count": 2 },
                { "key": "2026-02-01T08:00:00+00:00", "count": 1 }
            ] })
        );
    }

    #[tokio::test]
    async fn total_counts_matches_beyond_the_page() {
        let repo = blog_entries();
        let mut criteria = Criteria::new();
        criteria.set_limit(Some(2)).set_offset(Some(4));
        let result: EntitySearchResult<Value> =
            repo.search(&criteria, &SalesChannelContext::default()).await.unwrap();
        assert_eq!((result.total, result.elements.len()), (3, 0));
        assert_eq!(repo.search_count(), 1);
    }
}
