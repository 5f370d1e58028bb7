//! Builds parameterized SELECTs from entity definitions and criteria.
//! Translated fields resolve through one LEFT JOIN per language in the context chain;
//! associations load as nested scalar subqueries (row_to_json for to-one, json_agg for to-many).

use crate::context::SalesChannelContext;
use crate::criteria::{Aggregation, AggregationKind, Criteria, Filter};
use crate::error::AppError;
use crate::schema::{DefinitionRegistry, EntityDefinition, Field, FieldKind, ScalarType};
use crate::sql::PgBindValue;

/// Column alias carrying `COUNT(*) OVER ()` on search queries.
pub const TOTAL_COLUMN: &str = "_total";

const MAIN_ALIAS: &str = "main";
const MAX_ASSOCIATION_DEPTH: usize = 8;

/// Quote identifier for PostgreSQL (safe: identifiers are validated at registration).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn push_param(&mut self, v: PgBindValue) -> String {
        self.params.push(v);
        format!("${}", self.params.len())
    }
}

/// One table occurrence in the query: its alias and the aliases of its translation joins.
struct Scope<'d> {
    def: &'d EntityDefinition,
    alias: String,
    translation_aliases: Vec<String>,
}

impl Scope<'_> {
    fn column(&self, column: &str) -> String {
        format!("{}.{}", self.alias, quoted(column))
    }

    /// SQL expression for a scalar field, or None for associations.
    fn field_expr(&self, field: &Field) -> Option<String> {
        match &field.kind {
            FieldKind::Translated { column, .. } => {
                let parts: Vec<String> = self
                    .translation_aliases
                    .iter()
                    .map(|t| format!("{}.{}", t, quoted(column)))
                    .collect();
                Some(match parts.len() {
                    1 => parts.into_iter().next().unwrap_or_default(),
                    _ => format!("COALESCE({})", parts.join(", ")),
                })
            }
            _ => field.storage_column().map(|c| self.column(c)),
        }
    }

    fn order_by(&self) -> String {
        let mut parts = Vec::new();
        if let Some((property, direction)) = &self.def.default_sort {
            if let Some(expr) = self.def.field(property).and_then(|f| self.field_expr(f)) {
                parts.push(format!("{} {}", expr, direction.as_sql()));
            }
        }
        parts.push(format!("{} ASC", self.column(self.def.id_column())));
        parts.join(", ")
    }
}

struct Builder<'a> {
    registry: &'a DefinitionRegistry,
    criteria: &'a Criteria,
    q: QueryBuf,
    language_params: Vec<String>,
    version_param: String,
    alias_seq: usize,
}

impl<'a> Builder<'a> {
    fn new(registry: &'a DefinitionRegistry, criteria: &'a Criteria, context: &SalesChannelContext) -> Self {
        let mut q = QueryBuf::default();
        let language_params = context
            .language_chain
            .iter()
            .map(|id| q.push_param(PgBindValue::Uuid(*id)))
            .collect();
        let version_param = q.push_param(PgBindValue::Uuid(context.version_id));
        Builder {
            registry,
            criteria,
            q,
            language_params,
            version_param,
            alias_seq: 0,
        }
    }

    fn next_alias(&mut self) -> String {
        self.alias_seq += 1;
        format!("a{}", self.alias_seq)
    }

    /// `"table" alias` followed by the translation joins for `def`.
    fn from_clause<'d>(&self, def: &'d EntityDefinition, alias: String) -> (String, Scope<'d>) {
        let mut sql = format!("{} {}", quoted(&def.table), alias);
        let mut translation_aliases = Vec::new();
        if let Some(tt) = &def.translation_table {
            let reference = def.translation_reference_column();
            for (i, lang) in self.language_params.iter().enumerate() {
                let t = format!("{}_t{}", alias, i);
                sql.push_str(&format!(
                    " LEFT JOIN {} {} ON {}.{} = {}.{} AND {}.{} = {}",
                    quoted(tt),
                    t,
                    t,
                    quoted(&reference),
                    alias,
                    quoted(def.id_column()),
                    t,
                    quoted("language_id"),
                    lang
                ));
                if def.is_versioned() {
                    sql.push_str(&format!(
                        " AND {}.{} = {}.{}",
                        t,
                        quoted(&format!("{}_version_id", def.table)),
                        alias,
                        quoted("version_id")
                    ));
                }
                translation_aliases.push(t);
            }
        }
        (
            sql,
            Scope {
                def,
                alias,
                translation_aliases,
            },
        )
    }

    fn select_list(&mut self, scope: &Scope<'_>, path: &str, depth: usize) -> Result<Vec<String>, AppError> {
        let mut parts: Vec<String> = scope
            .def
            .scalar_fields()
            .filter_map(|f| scope.field_expr(f).map(|e| format!("{} AS {}", e, quoted(&f.property))))
            .collect();
        for field in scope.def.association_fields() {
            let child_path = if path.is_empty() {
                field.property.clone()
            } else {
                format!("{}.{}", path, field.property)
            };
            if !(self.criteria.has_association(&child_path) || field.is_auto_loaded()) {
                continue;
            }
            if depth >= MAX_ASSOCIATION_DEPTH {
                return Err(AppError::BadRequest(format!("association path too deep: {}", child_path)));
            }
            let sub = self.association_subquery(scope, field, &child_path, depth + 1)?;
            parts.push(format!("{} AS {}", sub, quoted(&field.property)));
        }
        Ok(parts)
    }

    fn association_subquery(
        &mut self,
        parent: &Scope<'_>,
        field: &Field,
        path: &str,
        depth: usize,
    ) -> Result<String, AppError> {
        let reference = field.association_reference().unwrap_or_default();
        let registry = self.registry;
        let target = registry.require(reference)?;
        let alias = self.next_alias();
        let (from, scope) = self.from_clause(target, alias);
        let cols = self.select_list(&scope, path, depth)?.join(", ");
        let id = scope.column(target.id_column());
        let parent_id = parent.column(parent.def.id_column());

        let mut conds = Vec::new();
        let mut version_bound = false;
        let to_one = match &field.kind {
            FieldKind::ManyToOne { local_column, .. } | FieldKind::OneToOne { local_column, .. } => {
                conds.push(format!("{} = {}", id, parent.column(local_column)));
                if let Some(rv) = parent.def.reference_version_column(&target.entity_name) {
                    conds.push(format!("{} = {}", scope.column("version_id"), parent.column(rv)));
                    version_bound = true;
                }
                true
            }
            FieldKind::OneToMany { reference_column, .. } => {
                conds.push(format!("{} = {}", scope.column(reference_column), parent_id));
                if let Some(rv) = target.reference_version_column(&parent.def.entity_name) {
                    conds.push(format!("{} = {}", scope.column(rv), parent.column("version_id")));
                }
                false
            }
            FieldKind::ManyToMany {
                mapping_table,
                local_column,
                reference_column,
                ..
            } => {
                conds.push(format!(
                    "{} IN (SELECT m.{} FROM {} m WHERE m.{} = {})",
                    id,
                    quoted(reference_column),
                    quoted(mapping_table),
                    quoted(local_column),
                    parent_id
                ));
                false
            }
            _ => return Err(AppError::BadRequest(format!("{} is not an association", field.property))),
        };
        if target.is_versioned() && !version_bound {
            conds.push(format!("{} = {}", scope.column("version_id"), self.version_param));
        }

        let inner = format!("SELECT {} FROM {} WHERE {}", cols, from, conds.join(" AND "));
        Ok(if to_one {
            format!("(SELECT row_to_json(sub) FROM ({} LIMIT 1) sub)", inner)
        } else {
            format!(
                "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM ({} ORDER BY {}) sub)",
                inner,
                scope.order_by()
            )
        })
    }

    /// WHERE clause for the root scope: version, id restriction, filters.
    fn where_clause(&mut self, scope: &Scope<'_>) -> Result<String, AppError> {
        let criteria = self.criteria;
        let mut conds = Vec::new();
        if scope.def.is_versioned() {
            conds.push(format!("{} = {}", scope.column("version_id"), self.version_param));
        }
        if let Some(ids) = criteria.ids() {
            let id_field = scope
                .def
                .field("id")
                .ok_or_else(|| AppError::BadRequest(format!("{} has no id field", scope.def.entity_name)))?;
            let values: Vec<serde_json::Value> = ids.iter().map(|s| serde_json::Value::String(s.clone())).collect();
            conds.push(self.in_condition(scope, id_field, &values)?);
        }
        for filter in criteria.filters() {
            let field = resolve_filter_field(scope.def, filter.field())?;
            let cond = match filter {
                Filter::Equals { value, .. } => {
                    let expr = scope.field_expr(field).unwrap_or_default();
                    let ty = field.scalar_type().unwrap_or(ScalarType::Text);
                    match PgBindValue::for_type(&field.property, ty, value)? {
                        PgBindValue::Null => format!("{} IS NULL", expr),
                        bind => format!("{} = {}", expr, self.q.push_param(bind)),
                    }
                }
                Filter::EqualsAny { values, .. } => self.in_condition(scope, field, values)?,
            };
            conds.push(cond);
        }
        Ok(if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        })
    }

    fn in_condition(
        &mut self,
        scope: &Scope<'_>,
        field: &Field,
        values: &[serde_json::Value],
    ) -> Result<String, AppError> {
        if values.is_empty() {
            return Ok("1 = 0".into());
        }
        let ty = field.scalar_type().unwrap_or(ScalarType::Text);
        let mut placeholders = Vec::with_capacity(values.len());
        for v in values {
            let bind = PgBindValue::for_type(&field.property, ty, v)?;
            placeholders.push(self.q.push_param(bind));
        }
        Ok(format!(
            "{} IN ({})",
            scope.field_expr(field).unwrap_or_default(),
            placeholders.join(", ")
        ))
    }
}

fn resolve_filter_field<'d>(def: &'d EntityDefinition, property: &str) -> Result<&'d Field, AppError> {
    def.field(property)
        .filter(|f| f.scalar_type().is_some())
        .ok_or_else(|| {
            AppError::BadRequest(format!("{} has no filterable field {}", def.entity_name, property))
        })
}

/// Search query: scalar fields, requested and auto-loaded associations, the filtered total
/// as `_total`, default sort, limit and offset.
pub fn select_search(
    registry: &DefinitionRegistry,
    def: &EntityDefinition,
    criteria: &Criteria,
    context: &SalesChannelContext,
) -> Result<QueryBuf, AppError> {
    // Reject bad aggregation fields before the search itself runs.
    for aggregation in criteria.aggregations() {
        resolve_filter_field(def, &aggregation.field)?;
    }
    let mut b = Builder::new(registry, criteria, context);
    let (from, scope) = b.from_clause(def, MAIN_ALIAS.to_string());
    let mut select_parts = b.select_list(&scope, "", 0)?;
    select_parts.push(format!("COUNT(*) OVER () AS {}", quoted(TOTAL_COLUMN)));
    let where_clause = b.where_clause(&scope)?;
    let limit_clause = criteria.limit().map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = criteria
        .offset()
        .filter(|n| *n > 0)
        .map(|n| format!(" OFFSET {}", n))
        .unwrap_or_default();
    b.q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        select_parts.join(", "),
        from,
        where_clause,
        scope.order_by(),
        limit_clause,
        offset_clause
    );
    Ok(b.q)
}

/// Aggregation over the filtered set (limit and offset do not apply).
/// Count yields one row `count`; terms yields rows `key`, `count`.
pub fn select_aggregation(
    registry: &DefinitionRegistry,
    def: &EntityDefinition,
    criteria: &Criteria,
    context: &SalesChannelContext,
    aggregation: &Aggregation,
) -> Result<QueryBuf, AppError> {
    let mut b = Builder::new(registry, criteria, context);
    let (from, scope) = b.from_clause(def, MAIN_ALIAS.to_string());
    let field = resolve_filter_field(def, &aggregation.field)?;
    let expr = scope.field_expr(field).unwrap_or_default();
    let where_clause = b.where_clause(&scope)?;
    b.q.sql = match aggregation.kind {
        AggregationKind::Count => format!("SELECT COUNT({}) AS \"count\" FROM {}{}", expr, from, where_clause),
        AggregationKind::Terms => {
            // json has no equality operator; group its text form instead
            let key = match field.scalar_type() {
                Some(ScalarType::Json) => format!("{}::text", expr),
                _ => expr,
            };
            format!(
                "SELECT {} AS \"key\", COUNT(*) AS \"count\" FROM {}{} GROUP BY 1 ORDER BY 2 DESC, 1 ASC",
                key, from, where_clause
            )
        }
    };
    Ok(b.q)
}

/// Filtered row count on its own, for pages that return no rows to carry the window total.
pub fn select_count(
    registry: &DefinitionRegistry,
    def: &EntityDefinition,
    criteria: &Criteria,
    context: &SalesChannelContext,
) -> Result<QueryBuf, AppError> {
    let mut b = Builder::new(registry, criteria, context);
    let (from, scope) = b.from_clause(def, MAIN_ALIAS.to_string());
    let where_clause = b.where_clause(&scope)?;
    b.q.sql = format!("SELECT COUNT(*) AS \"count\" FROM {}{}", from, where_clause);
    Ok(b.q)
}
