//! Field descriptors: storage columns, translated properties and associations.

/// Search ranking weights used by the host's search indexer.
pub struct SearchRanking;

impl SearchRanking {
    pub const HIGH: f32 = 500.0;
    pub const MIDDLE: f32 = 250.0;
    pub const LOW: f32 = 80.0;
    pub const ASSOCIATION: f32 = 0.25;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Flag {
    Required,
    PrimaryKey,
    /// Exposed through the store API.
    ApiAware,
    /// Deleting the owner removes the related rows.
    CascadeDelete,
    /// Value is taken from the parent entity when missing.
    Inherited,
    SearchRanking(f32),
}

/// Scalar storage type; drives request value coercion and bind types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Uuid,
    Bool,
    Int,
    Text,
    Timestamp,
    Json,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// Column on the entity's own table.
    Storage { column: String, ty: ScalarType },
    /// Foreign key column referencing another definition's primary key.
    Fk { column: String, reference: String },
    /// `<entity>_version_id` column pairing an fk with a versioned target.
    ReferenceVersion { column: String, reference: String },
    /// `version_id` column of a versioned entity.
    Version,
    /// Column living on the translation table, resolved per language.
    Translated { column: String, ty: ScalarType },
    /// The translation rows themselves, keyed by `reference_column`.
    Translations { reference_column: String },
    ManyToOne { local_column: String, reference: String, auto_load: bool },
    OneToOne { local_column: String, reference: String, auto_load: bool },
    /// `reference_column` on the target table points back to our primary key.
    OneToMany { reference: String, reference_column: String },
    ManyToMany {
        reference: String,
        mapping_table: String,
        local_column: String,
        reference_column: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// API property name (camelCase).
    pub property: String,
    pub kind: FieldKind,
    pub flags: Vec<Flag>,
}

impl Field {
    fn new(property: &str, kind: FieldKind) -> Self {
        Field {
            property: property.to_string(),
            kind,
            flags: Vec::new(),
        }
    }

    pub fn id(column: &str, property: &str) -> Self {
        Self::new(
            property,
            FieldKind::Storage {
                column: column.into(),
                ty: ScalarType::Uuid,
            },
        )
    }

    pub fn bool(column: &str, property: &str) -> Self {
        Self::storage(column, property, ScalarType::Bool)
    }

    pub fn date(column: &str, property: &str) -> Self {
        Self::storage(column, property, ScalarType::Timestamp)
    }

    pub fn storage(column: &str, property: &str, ty: ScalarType) -> Self {
        Self::new(property, FieldKind::Storage { column: column.into(), ty })
    }

    pub fn fk(column: &str, property: &str, reference: &str) -> Self {
        Self::new(
            property,
            FieldKind::Fk {
                column: column.into(),
                reference: reference.into(),
            },
        )
    }

    /// Pairs with an fk to a versioned entity; property is `<camel reference>VersionId`.
    pub fn reference_version(reference: &str) -> Self {
        let column = format!("{}_version_id", reference);
        let property = crate::case::to_camel_case(&column);
        Self::new(
            &property,
            FieldKind::ReferenceVersion {
                column,
                reference: reference.into(),
            },
        )
    }

    pub fn version() -> Self {
        Self::new("versionId", FieldKind::Version)
    }

    /// Translated column; the column name is derived from the property.
    pub fn translated(property: &str) -> Self {
        Self::translated_typed(property, ScalarType::Text)
    }

    pub fn translated_typed(property: &str, ty: ScalarType) -> Self {
        Self::new(
            property,
            FieldKind::Translated {
                column: crate::case::to_snake_case(property),
                ty,
            },
        )
    }

    pub fn translations(reference_column: &str) -> Self {
        Self::new(
            "translations",
            FieldKind::Translations {
                reference_column: reference_column.into(),
            },
        )
    }

    pub fn many_to_one(property: &str, local_column: &str, reference: &str, auto_load: bool) -> Self {
        Self::new(
            property,
            FieldKind::ManyToOne {
                local_column: local_column.into(),
                reference: reference.into(),
                auto_load,
            },
        )
    }

    pub fn one_to_one(property: &str, local_column: &str, reference: &str, auto_load: bool) -> Self {
        Self::new(
            property,
            FieldKind::OneToOne {
                local_column: local_column.into(),
                reference: reference.into(),
                auto_load,
            },
        )
    }

    pub fn one_to_many(property: &str, reference: &str, reference_column: &str) -> Self {
        Self::new(
            property,
            FieldKind::OneToMany {
                reference: reference.into(),
                reference_column: reference_column.into(),
            },
        )
    }

    pub fn many_to_many(
        property: &str,
        reference: &str,
        mapping_table: &str,
        local_column: &str,
        reference_column: &str,
    ) -> Self {
        Self::new(
            property,
            FieldKind::ManyToMany {
                reference: reference.into(),
                mapping_table: mapping_table.into(),
                local_column: local_column.into(),
                reference_column: reference_column.into(),
            },
        )
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn has_flag(&self, flag: &Flag) -> bool {
        self.flags.iter().any(|f| match (f, flag) {
            (Flag::SearchRanking(_), Flag::SearchRanking(_)) => true,
            _ => f == flag,
        })
    }

    pub fn is_required(&self) -> bool {
        self.has_flag(&Flag::Required)
    }

    pub fn is_primary_key(&self) -> bool {
        self.has_flag(&Flag::PrimaryKey)
    }

    pub fn search_ranking(&self) -> Option<f32> {
        self.flags.iter().find_map(|f| match f {
            Flag::SearchRanking(r) => Some(*r),
            _ => None,
        })
    }

    /// Column on the entity's own table, if this field is backed by one.
    pub fn storage_column(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Storage { column, .. }
            | FieldKind::Fk { column, .. }
            | FieldKind::ReferenceVersion { column, .. } => Some(column),
            FieldKind::Version => Some("version_id"),
            _ => None,
        }
    }

    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.kind {
            FieldKind::Storage { ty, .. } | FieldKind::Translated { ty, .. } => Some(*ty),
            FieldKind::Fk { .. } | FieldKind::ReferenceVersion { .. } | FieldKind::Version => {
                Some(ScalarType::Uuid)
            }
            _ => None,
        }
    }

    /// Target definition name for association fields.
    pub fn association_reference(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::ManyToOne { reference, .. }
            | FieldKind::OneToOne { reference, .. }
            | FieldKind::OneToMany { reference, .. }
            | FieldKind::ManyToMany { reference, .. } => Some(reference),
            _ => None,
        }
    }

    pub fn is_auto_loaded(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::ManyToOne { auto_load: true, .. } | FieldKind::OneToOne { auto_load: true, .. }
        )
    }
}
