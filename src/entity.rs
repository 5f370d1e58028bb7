//! Typed records returned by the store API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Nullable bool columns read as false.
fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Blog entry with translated fields resolved for the request language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogEntry {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_false")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub detail_teaser_image: bool,
    pub media_id: Option<Uuid>,
    pub author_id: Uuid,
    pub cms_page_id: Uuid,
    pub cms_page_version_id: Uuid,
    pub published_at: DateTime<Utc>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub teaser: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub content: Option<String>,
    pub custom_fields: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_author: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_categories: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_page: Option<Value>,
    /// Canonical detail-page URLs, attached after the search; empty when none exist.
    #[serde(default)]
    pub seo_urls: Vec<SeoUrl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoUrl {
    pub id: Uuid,
    pub language_id: Uuid,
    pub sales_channel_id: Option<Uuid>,
    pub foreign_key: Uuid,
    pub route_name: String,
    pub path_info: String,
    pub seo_path_info: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_canonical: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_modified: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_deleted: bool,
}
