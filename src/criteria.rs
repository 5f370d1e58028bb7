//! Request-scoped query descriptor: id restriction, filters, association paths, paging, aggregations.

use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// `field = value`
    Equals { field: String, value: Value },
    /// `field IN (values)`; an empty list matches nothing.
    EqualsAny { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Filter::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn equals_any<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::EqualsAny {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Filter::Equals { field, .. } | Filter::EqualsAny { field, .. } => field,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregationKind {
    Count,
    Terms,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregation {
    pub name: String,
    pub kind: AggregationKind,
    pub field: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    ids: Option<Vec<String>>,
    filters: Vec<Filter>,
    /// Dotted association paths; every prefix is stored too.
    associations: BTreeSet<String>,
    limit: Option<u32>,
    offset: Option<u32>,
    aggregations: Vec<Aggregation>,
}

impl Criteria {
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Restrict the result to these primary keys, replacing any earlier restriction.
    pub fn set_ids<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Add `path` and all of its parents, e.g. `cmsPage.sections` also adds `cmsPage`.
    pub fn add_association(&mut self, path: &str) -> &mut Self {
        let mut prefix = String::new();
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            self.associations.insert(prefix.clone());
        }
        self
    }

    pub fn add_associations<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for path in paths {
            self.add_association(path);
        }
        self
    }

    pub fn set_limit(&mut self, limit: Option<u32>) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn set_offset(&mut self, offset: Option<u32>) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn add_aggregation(&mut self, aggregation: Aggregation) -> &mut Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn ids(&self) -> Option<&[String]> {
        self.ids.as_deref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn has_association(&self, path: &str) -> bool {
        self.associations.contains(path)
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn association_paths_include_parents() {
        let mut c = Criteria::new();
        c.add_associations(["cmsPage.sections.blocks.slots", "blogAuthor.salutation", "tags"]);
        for p in ["cmsPage", "cmsPage.sections", "cmsPage.sections.blocks", "blogAuthor", "tags"] {
            assert!(c.has_association(p), "{}", p);
        }
        assert!(!c.has_association("sections"));
    }

    #[test]
    fn set_ids_replaces_previous_restriction() {
        let mut c = Criteria::new();
        c.set_ids(["a", "b"]).set_ids(["c"]);
        assert_eq!(c.ids(), Some(&["c".to_string()][..]));
    }

    #[test]
    fn filters_keep_insertion_order() {
        let mut c = Criteria::new();
        c.add_filter(Filter::equals_any("foreignKey", ["x", "y"]))
            .add_filter(Filter::equals("isCanonical", true));
        let fields: Vec<_> = c.filters().iter().map(Filter::field).collect();
        assert_eq!(fields, vec!["foreignKey", "isCanonical"]);
    }
}
