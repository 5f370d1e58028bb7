//! Declarative entity schema: fields, translations, associations and cascade rules.

pub mod blog;
pub mod definition;
pub mod field;
pub mod host;
pub mod validator;

pub use definition::*;
pub use field::*;
pub use validator::validate;

use crate::error::SchemaError;

/// Build and validate the registry with the blog entry and every definition it reaches.
pub fn registry() -> Result<DefinitionRegistry, SchemaError> {
    let mut registry = DefinitionRegistry::new();
    registry.register(blog::blog_entries_definition());
    registry.register(host::media_definition());
    registry.register(host::blog_author_definition());
    registry.register(host::salutation_definition());
    registry.register(host::blog_category_definition());
    registry.register(host::tag_definition());
    registry.register(host::cms_page_definition());
    registry.register(host::cms_section_definition());
    registry.register(host::cms_block_definition());
    registry.register(host::cms_slot_definition());
    registry.register(host::seo_url_definition());
    registry.register(host::language_definition());
    registry.register(host::sales_channel_definition());
    validate(&registry)?;
    Ok(registry)
}
