#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use blog_store_api::context::SYSTEM_LANGUAGE_ID;
use blog_store_api::schema::{self, blog::BLOG_ENTRIES};
use blog_store_api::service::blog::BLOG_DETAIL_ROUTE;
use blog_store_api::{AbstractBlogRoute, AppState, BlogEntry, BlogRoute, InMemoryRepository, SeoUrl, Settings};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const AUTHOR_ID: &str = "0a3f4a2e-1c2b-4f6f-9a58-2f7d4f6b1e01";
pub const CMS_PAGE_ID: &str = "7b6c6f5e-3d2a-4a19-8c3e-5e4d3c2b1a00";

pub fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("Invalid time format in test helper")
        .with_timezone(&Utc)
}

pub fn entry(id: &str, slug: &str, published_at: &str) -> BlogEntry {
    BlogEntry {
        id: uuid(id),
        active: true,
        detail_teaser_image: false,
        media_id: None,
        author_id: uuid(AUTHOR_ID),
        cms_page_id: uuid(CMS_PAGE_ID),
        cms_page_version_id: blog_store_api::context::LIVE_VERSION_ID,
        published_at: parse_time(published_at),
        title: Some(slug.replace('-', " ")),
        slug: Some(slug.to_string()),
        teaser: None,
        meta_title: None,
        meta_description: None,
        content: None,
        custom_fields: None,
        media: None,
        blog_author: None,
        blog_categories: None,
        tags: None,
        cms_page: None,
        seo_urls: Vec::new(),
    }
}

pub fn seo_url(foreign_key: &str, path: &str, route_name: &str, is_canonical: bool) -> SeoUrl {
    let foreign_key = uuid(foreign_key);
    SeoUrl {
        id: Uuid::new_v4(),
        language_id: SYSTEM_LANGUAGE_ID,
        sales_channel_id: None,
        foreign_key,
        route_name: route_name.to_string(),
        path_info: format!("/blog/{}", foreign_key.simple()),
        seo_path_info: path.to_string(),
        is_canonical,
        is_modified: false,
        is_deleted: false,
    }
}

pub fn canonical(foreign_key: &str, path: &str) -> SeoUrl {
    seo_url(foreign_key, path, BLOG_DETAIL_ROUTE, true)
}

pub fn settings(extra: &[(&str, &str)]) -> Settings {
    let extra: Vec<(String, String)> = extra.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::from_lookup(move |key| {
        if key == "DATABASE_URL" {
            return Some("postgres://localhost/blog_test".into());
        }
        extra.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })
    .expect("test settings")
}

/// Router over in-memory repositories; the repositories stay reachable for assertions.
pub struct TestApp {
    pub router: Router,
    pub blogs: Arc<InMemoryRepository<BlogEntry>>,
    pub seo_urls: Arc<InMemoryRepository<SeoUrl>>,
}

pub fn repositories(
    entries: Vec<BlogEntry>,
    seo_urls: Vec<SeoUrl>,
) -> (Arc<InMemoryRepository<BlogEntry>>, Arc<InMemoryRepository<SeoUrl>>) {
    let registry = schema::registry().expect("registry");
    let blogs = InMemoryRepository::new(registry.require(BLOG_ENTRIES).unwrap().clone(), entries).unwrap();
    let seo = InMemoryRepository::new(registry.require("seo_url").unwrap().clone(), seo_urls).unwrap();
    (Arc::new(blogs), Arc::new(seo))
}

pub fn state_with_route(route: Arc<dyn AbstractBlogRoute>, settings: Settings) -> AppState {
    AppState {
        settings: Arc::new(settings),
        blog_route: route,
        pool: None,
    }
}

pub fn test_app(entries: Vec<BlogEntry>, seo_urls: Vec<SeoUrl>) -> TestApp {
    test_app_with(entries, seo_urls, settings(&[]))
}

pub fn test_app_with(entries: Vec<BlogEntry>, seo_urls: Vec<SeoUrl>, settings: Settings) -> TestApp {
    let (blogs, seo_urls) = repositories(entries, seo_urls);
    let route = BlogRoute::new(blogs.clone(), seo_urls.clone());
    TestApp {
        router: blog_store_api::app(state_with_route(Arc::new(route), settings)),
        blogs,
        seo_urls,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // non-JSON bodies (e.g. from tower-http layers) come back as a string
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}
