//! The blog entry definition and its translation / mapping tables.

use crate::schema::{EntityDefinition, Field, Flag, ScalarType, SearchRanking, SortDirection};
use serde_json::{Map, Value};

pub const BLOG_ENTRIES: &str = "werkl_blog_entries";
pub const BLOG_AUTHOR: &str = "werkl_blog_author";
pub const BLOG_CATEGORY: &str = "werkl_blog_category";
pub const BLOG_CATEGORY_MAPPING: &str = "werkl_blog_blog_category";
pub const BLOG_TAG_MAPPING: &str = "werkl_blog_entries_tag";

fn blog_entries_defaults() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert(
        "publishedAt".into(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    defaults
}

pub fn blog_entries_definition() -> EntityDefinition {
    use Flag::{ApiAware, CascadeDelete, Inherited, PrimaryKey, Required};
    EntityDefinition::new(
        BLOG_ENTRIES,
        vec![
            Field::id("id", "id").flags([Required, PrimaryKey, ApiAware]),
            Field::bool("active", "active").flag(ApiAware),
            Field::bool("detail_teaser_image", "detailTeaserImage").flag(ApiAware),
            Field::fk("media_id", "mediaId", "media"),
            Field::fk("author_id", "authorId", BLOG_AUTHOR).flag(Required),
            Field::fk("cms_page_id", "cmsPageId", "cms_page").flags([ApiAware, Inherited, Required]),
            Field::reference_version("cms_page").flags([PrimaryKey, Required]),
            Field::one_to_one("media", "media_id", "media", true).flag(ApiAware),
            Field::translated("title").flags([ApiAware, Flag::SearchRanking(SearchRanking::HIGH)]),
            Field::translated("slug").flags([ApiAware, Flag::SearchRanking(SearchRanking::HIGH)]),
            Field::translated("teaser").flags([ApiAware, Flag::SearchRanking(SearchRanking::HIGH)]),
            Field::translated("metaTitle").flags([ApiAware, Flag::SearchRanking(SearchRanking::HIGH)]),
            Field::translated("metaDescription").flags([ApiAware, Flag::SearchRanking(SearchRanking::MIDDLE)]),
            Field::translated("content").flags([ApiAware, Flag::SearchRanking(SearchRanking::MIDDLE)]),
            Field::translated_typed("customFields", ScalarType::Json).flag(ApiAware),
            Field::date("published_at", "publishedAt").flags([Required, ApiAware]),
            Field::translations("werkl_blog_entries_id").flag(Required),
            Field::many_to_many(
                "blogCategories",
                BLOG_CATEGORY,
                BLOG_CATEGORY_MAPPING,
                "werkl_blog_entries_id",
                "werkl_blog_category_id",
            )
            .flags([CascadeDelete, ApiAware, Flag::SearchRanking(SearchRanking::ASSOCIATION)]),
            Field::many_to_one("blogAuthor", "author_id", BLOG_AUTHOR, false)
                .flags([ApiAware, Flag::SearchRanking(SearchRanking::ASSOCIATION)]),
            Field::one_to_one("cmsPage", "cms_page_id", "cms_page", false).flag(ApiAware),
            Field::many_to_many("tags", "tag", BLOG_TAG_MAPPING, "werkl_blog_entries_id", "tag_id")
                .flag(ApiAware),
            Field::one_to_many("seoUrls", "seo_url", "foreign_key").flags([ApiAware, CascadeDelete]),
        ],
    )
    .translated()
    .sorted_by("publishedAt", SortDirection::Desc)
    .with_defaults(blog_entries_defaults)
}
