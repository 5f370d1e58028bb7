//! Registry validation: referential integrity and identifier safety.

use crate::error::SchemaError;
use crate::schema::{DefinitionRegistry, EntityDefinition, FieldKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("static identifier pattern"))
}

fn check_identifier(entity: &str, ident: &str) -> Result<(), SchemaError> {
    if identifier_re().is_match(ident) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            entity: entity.to_string(),
            identifier: ident.to_string(),
        })
    }
}

/// Validate every definition; called once at registration.
pub fn validate(registry: &DefinitionRegistry) -> Result<(), SchemaError> {
    for def in registry.definitions() {
        validate_definition(registry, def)?;
    }
    Ok(())
}

fn validate_definition(registry: &DefinitionRegistry, def: &EntityDefinition) -> Result<(), SchemaError> {
    let name = def.entity_name.as_str();
    check_identifier(name, &def.table)?;
    if let Some(t) = &def.translation_table {
        check_identifier(name, t)?;
    }
    if def.primary_key().is_empty() {
        return Err(SchemaError::MissingPrimaryKey(name.to_string()));
    }

    let mut properties = HashSet::new();
    for field in &def.fields {
        if !properties.insert(field.property.as_str()) {
            return Err(SchemaError::DuplicateField {
                entity: name.to_string(),
                property: field.property.clone(),
            });
        }
        match &field.kind {
            FieldKind::Storage { column, .. } => check_identifier(name, column)?,
            FieldKind::Fk { column, reference } | FieldKind::ReferenceVersion { column, reference } => {
                check_identifier(name, column)?;
                registry.require(reference)?;
            }
            FieldKind::Version => {}
            FieldKind::Translated { column, .. } => {
                if def.translation_table.is_none() {
                    return Err(SchemaError::MissingTranslationTable(name.to_string()));
                }
                check_identifier(name, column)?;
            }
            FieldKind::Translations { reference_column } => {
                if def.translation_table.is_none() {
                    return Err(SchemaError::MissingTranslationTable(name.to_string()));
                }
                check_identifier(name, reference_column)?;
            }
            FieldKind::ManyToOne { local_column, reference, .. }
            | FieldKind::OneToOne { local_column, reference, .. } => {
                check_identifier(name, local_column)?;
                registry.require(reference)?;
                if !def.fields.iter().any(|f| f.storage_column() == Some(local_column.as_str())) {
                    return Err(SchemaError::MissingLocalColumn {
                        entity: name.to_string(),
                        column: local_column.clone(),
                    });
                }
            }
            FieldKind::OneToMany { reference, reference_column } => {
                check_identifier(name, reference_column)?;
                let target = registry.require(reference)?;
                if !target.fields.iter().any(|f| f.storage_column() == Some(reference_column.as_str())) {
                    return Err(SchemaError::MissingLocalColumn {
                        entity: target.entity_name.clone(),
                        column: reference_column.clone(),
                    });
                }
            }
            FieldKind::ManyToMany {
                reference,
                mapping_table,
                local_column,
                reference_column,
            } => {
                check_identifier(name, mapping_table)?;
                check_identifier(name, local_column)?;
                check_identifier(name, reference_column)?;
                registry.require(reference)?;
            }
        }
    }

    if let Some((property, _)) = &def.default_sort {
        if def.field(property).and_then(|f| f.scalar_type()).is_none() {
            return Err(SchemaError::UnknownField {
                entity: name.to_string(),
                property: property.clone(),
            });
        }
    }
    Ok(())
}
