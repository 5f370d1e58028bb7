//! Entity definitions and the registry the repository layer resolves them from.

use crate::error::SchemaError;
use crate::schema::field::{Field, FieldKind};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Defaults applied by the repository on create. Never evaluated at request time.
pub type DefaultsFn = fn() -> Map<String, Value>;

#[derive(Clone, Debug)]
pub struct EntityDefinition {
    pub entity_name: String,
    /// Table name; equal to the entity name for all current definitions.
    pub table: String,
    pub fields: Vec<Field>,
    /// `<table>_translation` when the entity has translated fields.
    pub translation_table: Option<String>,
    /// (property, direction) applied when the criteria carries no sorting.
    pub default_sort: Option<(String, SortDirection)>,
    pub defaults: Option<DefaultsFn>,
}

impl EntityDefinition {
    pub fn new(entity_name: &str, fields: Vec<Field>) -> Self {
        EntityDefinition {
            entity_name: entity_name.to_string(),
            table: entity_name.to_string(),
            fields,
            translation_table: None,
            default_sort: None,
            defaults: None,
        }
    }

    pub fn translated(mut self) -> Self {
        self.translation_table = Some(format!("{}_translation", self.table));
        self
    }

    pub fn sorted_by(mut self, property: &str, direction: SortDirection) -> Self {
        self.default_sort = Some((property.to_string(), direction));
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultsFn) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn field(&self, property: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.property == property)
    }

    pub fn primary_key(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_primary_key()).collect()
    }

    /// The single uuid `id` column used for id restrictions and joins.
    pub fn id_column(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.is_primary_key() && matches!(f.kind, FieldKind::Storage { .. }))
            .and_then(|f| f.storage_column())
            .unwrap_or("id")
    }

    pub fn is_versioned(&self) -> bool {
        self.fields.iter().any(|f| matches!(f.kind, FieldKind::Version))
    }

    /// Reference version column pairing with an fk to `reference`, if any.
    pub fn reference_version_column(&self, reference: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match &f.kind {
            FieldKind::ReferenceVersion { column, reference: r } if r == reference => Some(column.as_str()),
            _ => None,
        })
    }

    /// Column on the translation table pointing back at this entity.
    pub fn translation_reference_column(&self) -> String {
        self.fields
            .iter()
            .find_map(|f| match &f.kind {
                FieldKind::Translations { reference_column } => Some(reference_column.clone()),
                _ => None,
            })
            .unwrap_or_else(|| format!("{}_id", self.table))
    }

    /// Fields that are loaded as plain values (own table or translation table).
    pub fn scalar_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.scalar_type().is_some())
    }

    pub fn association_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.association_reference().is_some())
    }

    pub fn defaults(&self) -> Map<String, Value> {
        self.defaults.map(|f| f()).unwrap_or_default()
    }
}

/// All definitions known to the service, keyed by entity name.
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    by_name: HashMap<String, Arc<EntityDefinition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        DefinitionRegistry::default()
    }

    pub fn register(&mut self, definition: EntityDefinition) {
        self.by_name
            .insert(definition.entity_name.clone(), Arc::new(definition));
    }

    pub fn get(&self, entity_name: &str) -> Option<&Arc<EntityDefinition>> {
        self.by_name.get(entity_name)
    }

    pub fn require(&self, entity_name: &str) -> Result<&Arc<EntityDefinition>, SchemaError> {
        self.get(entity_name)
            .ok_or_else(|| SchemaError::UnknownDefinition(entity_name.to_string()))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<EntityDefinition>> {
        self.by_name.values()
    }
}
