//! Host platform definitions the blog entry associates with. Only the columns
//! the store API exposes are declared; the host owns the tables.

use crate::schema::{EntityDefinition, Field, Flag, ScalarType, SortDirection};

fn id() -> Field {
    Field::id("id", "id").flags([Flag::Required, Flag::PrimaryKey, Flag::ApiAware])
}

fn text(column: &str) -> Field {
    Field::storage(column, &crate::case::to_camel_case(column), ScalarType::Text).flag(Flag::ApiAware)
}

fn int(column: &str) -> Field {
    Field::storage(column, &crate::case::to_camel_case(column), ScalarType::Int).flag(Flag::ApiAware)
}

fn versioned_id() -> [Field; 2] {
    [id(), Field::version().flags([Flag::PrimaryKey, Flag::Required])]
}

pub fn media_definition() -> EntityDefinition {
    EntityDefinition::new(
        "media",
        vec![
            id(),
            text("mime_type"),
            text("file_extension"),
            text("file_name"),
            text("path"),
            Field::translated("alt").flag(Flag::ApiAware),
            Field::translated("title").flag(Flag::ApiAware),
            Field::translations("media_id"),
        ],
    )
    .translated()
}

pub fn blog_author_definition() -> EntityDefinition {
    EntityDefinition::new(
        super::blog::BLOG_AUTHOR,
        vec![
            id(),
            text("first_name"),
            text("last_name"),
            text("display_name"),
            text("email"),
            Field::fk("salutation_id", "salutationId", "salutation").flag(Flag::Required),
            Field::fk("media_id", "mediaId", "media"),
            Field::many_to_one("salutation", "salutation_id", "salutation", false).flag(Flag::ApiAware),
            Field::many_to_one("media", "media_id", "media", false).flag(Flag::ApiAware),
        ],
    )
}

pub fn salutation_definition() -> EntityDefinition {
    EntityDefinition::new(
        "salutation",
        vec![
            id(),
            text("salutation_key"),
            Field::translated("displayName").flag(Flag::ApiAware),
            Field::translated("letterName").flag(Flag::ApiAware),
            Field::translations("salutation_id"),
        ],
    )
    .translated()
}

pub fn blog_category_definition() -> EntityDefinition {
    EntityDefinition::new(
        super::blog::BLOG_CATEGORY,
        vec![
            id(),
            Field::fk("parent_id", "parentId", super::blog::BLOG_CATEGORY),
            Field::translated("name").flag(Flag::ApiAware),
            Field::translations("werkl_blog_category_id"),
        ],
    )
    .translated()
}

pub fn tag_definition() -> EntityDefinition {
    EntityDefinition::new("tag", vec![id(), text("name")]).sorted_by("name", SortDirection::Asc)
}

pub fn cms_page_definition() -> EntityDefinition {
    let mut fields = versioned_id().to_vec();
    fields.extend([
        text("type"),
        Field::translated("name").flag(Flag::ApiAware),
        Field::translations("cms_page_id"),
        Field::one_to_many("sections", "cms_section", "cms_page_id").flags([Flag::ApiAware, Flag::CascadeDelete]),
    ]);
    EntityDefinition::new("cms_page", fields).translated()
}

pub fn cms_section_definition() -> EntityDefinition {
    let mut fields = versioned_id().to_vec();
    fields.extend([
        Field::fk("cms_page_id", "pageId", "cms_page").flag(Flag::Required),
        Field::reference_version("cms_page").flag(Flag::Required),
        int("position"),
        text("type"),
        text("name"),
        text("sizing_mode"),
        Field::one_to_many("blocks", "cms_block", "cms_section_id").flags([Flag::ApiAware, Flag::CascadeDelete]),
    ]);
    EntityDefinition::new("cms_section", fields).sorted_by("position", SortDirection::Asc)
}

pub fn cms_block_definition() -> EntityDefinition {
    let mut fields = versioned_id().to_vec();
    fields.extend([
        Field::fk("cms_section_id", "sectionId", "cms_section").flag(Flag::Required),
        Field::reference_version("cms_section").flag(Flag::Required),
        int("position"),
        text("type"),
        text("section_position"),
        text("name"),
        Field::one_to_many("slots", "cms_slot", "cms_block_id").flags([Flag::ApiAware, Flag::CascadeDelete]),
    ]);
    EntityDefinition::new("cms_block", fields).sorted_by("position", SortDirection::Asc)
}

pub fn cms_slot_definition() -> EntityDefinition {
    let mut fields = versioned_id().to_vec();
    fields.extend([
        Field::fk("cms_block_id", "blockId", "cms_block").flag(Flag::Required),
        Field::reference_version("cms_block").flag(Flag::Required),
        text("type"),
        text("slot"),
        Field::translated_typed("config", ScalarType::Json).flag(Flag::ApiAware),
        Field::translations("cms_slot_id"),
    ]);
    EntityDefinition::new("cms_slot", fields).translated()
}

pub fn seo_url_definition() -> EntityDefinition {
    EntityDefinition::new(
        "seo_url",
        vec![
            id(),
            Field::fk("language_id", "languageId", "language").flag(Flag::Required),
            Field::fk("sales_channel_id", "salesChannelId", "sales_channel"),
            Field::storage("foreign_key", "foreignKey", ScalarType::Uuid).flags([Flag::Required, Flag::ApiAware]),
            text("route_name").flag(Flag::Required),
            text("path_info").flag(Flag::Required),
            text("seo_path_info").flag(Flag::Required),
            Field::bool("is_canonical", "isCanonical").flag(Flag::ApiAware),
            Field::bool("is_modified", "isModified").flag(Flag::ApiAware),
            Field::bool("is_deleted", "isDeleted").flag(Flag::ApiAware),
        ],
    )
}

/// Referenced only through fk columns; no store-facing fields.
pub fn language_definition() -> EntityDefinition {
    EntityDefinition::new("language", vec![id(), text("name")])
}

pub fn sales_channel_definition() -> EntityDefinition {
    EntityDefinition::new("sales_channel", vec![id()])
}
