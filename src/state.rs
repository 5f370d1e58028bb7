//! Shared application state for all routes.

use crate::entity::{BlogEntry, SeoUrl};
use crate::error::SchemaError;
use crate::repository::PgEntityRepository;
use crate::schema::{blog::BLOG_ENTRIES, DefinitionRegistry};
use crate::service::{AbstractBlogRoute, BlogRoute};
use crate::settings::Settings;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub blog_route: Arc<dyn AbstractBlogRoute>,
    /// Present when backed by PostgreSQL; used by the readiness probe.
    pub pool: Option<PgPool>,
}

impl AppState {
    /// Wire the PostgreSQL repositories into the blog route.
    pub fn postgres(settings: Settings, pool: PgPool, registry: Arc<DefinitionRegistry>) -> Result<Self, SchemaError> {
        let blog_repository = PgEntityRepository::<BlogEntry>::new(pool.clone(), registry.clone(), BLOG_ENTRIES)?;
        let seo_url_repository = PgEntityRepository::<SeoUrl>::new(pool.clone(), registry, "seo_url")?;
        Ok(AppState {
            settings: Arc::new(settings),
            blog_route: Arc::new(BlogRoute::new(Arc::new(blog_repository), Arc::new(seo_url_repository))),
            pool: Some(pool),
        })
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}
