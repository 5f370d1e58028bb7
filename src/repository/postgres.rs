//! PostgreSQL repository driven by the definition registry.

use crate::context::SalesChannelContext;
use crate::criteria::{Aggregation, AggregationKind, Criteria};
use crate::error::{AppError, SchemaError};
use crate::repository::{EntityRepository, EntitySearchResult};
use crate::schema::{DefinitionRegistry, EntityDefinition};
use crate::sql::{select_aggregation, select_count, select_search, QueryBuf, TOTAL_COLUMN};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::PgPool;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct PgEntityRepository<E> {
    pool: PgPool,
    registry: Arc<DefinitionRegistry>,
    definition: Arc<EntityDefinition>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgEntityRepository<E> {
    pub fn new(pool: PgPool, registry: Arc<DefinitionRegistry>, entity_name: &str) -> Result<Self, SchemaError> {
        let definition = registry.require(entity_name)?.clone();
        Ok(PgEntityRepository {
            pool,
            registry,
            definition,
            _entity: PhantomData,
        })
    }

    async fn fetch_rows(&self, q: &QueryBuf) -> Result<Vec<Map<String, Value>>, AppError> {
        tracing::debug!(entity = %self.definition.entity_name, sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_map).collect()
    }

    async fn aggregate(
        &self,
        criteria: &Criteria,
        context: &SalesChannelContext,
        aggregation: &Aggregation,
    ) -> Result<Value, AppError> {
        let q = select_aggregation(&self.registry, &self.definition, criteria, context, aggregation)?;
        let rows = self.fetch_rows(&q).await?;
        Ok(match aggregation.kind {
            AggregationKind::Count => {
                let count = rows.first().and_then(|r| r.get("count")).cloned().unwrap_or(json!(0));
                json!({ "count": count })
            }
            AggregationKind::Terms => {
                let buckets: Vec<Value> = rows
                    .into_iter()
                    .map(|mut r| json!({ "key": r.remove("key"), "count": r.remove("count") }))
                    .collect();
                json!({ "buckets": buckets })
            }
        })
    }
}

#[async_trait]
impl<E> EntityRepository<E> for PgEntityRepository<E>
where
    E: DeserializeOwned + Send + 'static,
{
    async fn search(
        &self,
        criteria: &Criteria,
        context: &SalesChannelContext,
    ) -> Result<EntitySearchResult<E>, AppError> {
        let q = select_search(&self.registry, &self.definition, criteria, context)?;
        let rows = self.fetch_rows(&q).await?;

        let mut total = 0u64;
        let mut elements = Vec::with_capacity(rows.len());
        for mut row in rows {
            if let Some(t) = row.remove(TOTAL_COLUMN).and_then(|v| v.as_u64()) {
                total = t;
            }
            elements.push(serde_json::from_value(Value::Object(row))?);
        }

        // The window total rides on the rows; a page past the end has none.
        if elements.is_empty() && criteria.offset().unwrap_or(0) > 0 {
            let q = select_count(&self.registry, &self.definition, criteria, context)?;
            let rows = self.fetch_rows(&q).await?;
            total = rows.first().and_then(|r| r.get("count")).and_then(Value::as_u64).unwrap_or(0);
        }

        let mut aggregations = Map::new();
        for aggregation in criteria.aggregations() {
            let value = self.aggregate(criteria, context, aggregation).await?;
            aggregations.insert(aggregation.name.clone(), value);
        }

        Ok(EntitySearchResult {
            total,
            aggregations,
            elements,
        })
    }
}

fn row_to_map(row: &PgRow) -> Result<Map<String, Value>, AppError> {
    use sqlx::Row;
    row.columns()
        .iter()
        .map(|col| Ok((sqlx::Column::name(col).to_string(), cell_to_value(row, col)?)))
        .collect()
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Decode by trying the column types the schema can declare; an unsupported type is an error.
fn cell_to_value(row: &PgRow, col: &PgColumn) -> Result<Value, AppError> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use sqlx::{Column, Row, TypeInfo};
    let name = col.name();
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Ok(v.map(|u| Value::String(u.to_string())).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return Ok(v.map(Value::Bool).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
        return Ok(v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return Ok(v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return Ok(v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
        return Ok(v.map(|n| number(n as f64)).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return Ok(v.map(number).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(name) {
        return Ok(v.map(|d| Value::String(d.to_rfc3339())).unwrap_or(Value::Null));
    }
    // timestamp without time zone holds UTC
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(name) {
        return Ok(v.map(|d| Value::String(d.and_utc().to_rfc3339())).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(name) {
        return Ok(v.map(|d| Value::String(d.format("%Y-%m-%d").to_string())).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return Ok(v.map(Value::String).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
        return Ok(v.unwrap_or(Value::Null));
    }
    Err(AppError::Db(sqlx::Error::ColumnDecode {
        index: name.to_string(),
        source: format!("unsupported column type {}", col.type_info().name()).into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SalesChannelContext;
    use crate::entity::BlogEntry;
    use crate::schema::blog::BLOG_ENTRIES;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::Executor;

    /// Pool on a throwaway schema of `TEST_DATABASE_URL`; None (test skipped) when unset.
    async fn scratch_pool() -> Option<(PgPool, String)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let schema = format!("blog_store_test_{}", uuid::Uuid::new_v4().simple());
        let admin = PgPool::connect(&url).await.expect("connect TEST_DATABASE_URL");
        admin
            .execute(format!("CREATE SCHEMA {}", schema).as_str())
            .await
            .expect("create schema");
        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .expect("connect scratch pool");
        pool.execute(
            r#"
            CREATE TABLE werkl_blog_entries (
                id uuid PRIMARY KEY,
                active boolean,
                detail_teaser_image boolean,
                media_id uuid,
                author_id uuid NOT NULL,
                cms_page_id uuid NOT NULL,
                cms_page_version_id uuid NOT NULL,
                published_at timestamp NOT NULL
            );
            CREATE TABLE werkl_blog_entries_translation (
                werkl_blog_entries_id uuid NOT NULL,
                language_id uuid NOT NULL,
                title text, slug text, teaser text, meta_title text,
                meta_description text, content text, custom_fields json
            );
            CREATE TABLE media (
                id uuid PRIMARY KEY, mime_type text, file_extension text, file_name text, path text
            );
            CREATE TABLE media_translation (
                media_id uuid NOT NULL, language_id uuid NOT NULL, alt text, title text
            );
            "#,
        )
        .await
        .expect("create tables");
        Some((pool, schema))
    }

    async fn seed(pool: &PgPool, published: &[&str]) {
        for (i, at) in published.iter().enumerate() {
            let id = uuid::Uuid::new_v4();
            sqlx::query(
                "INSERT INTO werkl_blog_entries (id, active, author_id, cms_page_id, cms_page_version_id, published_at) \
                 VALUES ($1, true, $2, $2, $2, $3::timestamp)",
            )
            .bind(id)
            .bind(uuid::Uuid::new_v4())
            .bind(*at)
            .execute(pool)
            .await
            .expect("insert entry");
            sqlx::query(
                "INSERT INTO werkl_blog_entries_translation (werkl_blog_entries_id, language_id, slug) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(crate::context::SYSTEM_LANGUAGE_ID)
            .bind(format!("post-{}", i))
            .execute(pool)
            .await
            .expect("insert translation");
        }
    }

    async fn drop_schema(pool: PgPool, schema: &str) {
        let _ = pool.execute(format!("DROP SCHEMA {} CASCADE", schema).as_str()).await;
    }

    fn repository(pool: &PgPool) -> PgEntityRepository<BlogEntry> {
        let registry = Arc::new(crate::schema::registry().unwrap());
        PgEntityRepository::new(pool.clone(), registry, BLOG_ENTRIES).unwrap()
    }

    #[tokio::test]
    async fn decodes_timestamp_without_time_zone_as_utc() {
        let Some((pool, schema)) = scratch_pool().await else {
            return;
        };
        seed(&pool, &["2026-01-01 10:00:00"]).await;

        let result = repository(&pool)
            .search(&Criteria::new(), &SalesChannelContext::default())
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.elements[0].published_at.to_rfc3339(), "2026-01-01T10:00:00+00:00");
        assert_eq!(result.elements[0].slug.as_deref(), Some("post-0"));
        assert_eq!(result.elements[0].media, None);

        drop_schema(pool, &schema).await;
    }

    #[tokio::test]
    async fn total_survives_pages_past_the_end() {
        let Some((pool, schema)) = scratch_pool().await else {
            return;
        };
        seed(&pool, &["2026-01-01 10:00:00", "2026-02-01 10:00:00", "2026-03-01 10:00:00"]).await;
        let repo = repository(&pool);
        let ctx = SalesChannelContext::default();

        let mut criteria = Criteria::new();
        criteria.set_limit(Some(2)).set_offset(Some(2));
        let page = repo.search(&criteria, &ctx).await.unwrap();
        assert_eq!((page.total, page.elements.len()), (3, 1));

        criteria.set_offset(Some(4));
        let past_end = repo.search(&criteria, &ctx).await.unwrap();
        assert_eq!((past_end.total, past_end.elements.len()), (3, 0));

        drop_schema(pool, &schema).await;
    }

    #[tokio::test]
    async fn unsupported_column_type_is_an_error() {
        let Some((pool, schema)) = scratch_pool().await else {
            return;
        };
        let row = sqlx::query("SELECT 1.5::numeric AS amount, NULL::numeric AS missing")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(matches!(row_to_map(&row), Err(AppError::Db(sqlx::Error::ColumnDecode { .. }))));

        drop_schema(pool, &schema).await;
    }
}
