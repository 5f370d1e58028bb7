//! Blog listing: entries by id or slug with their canonical detail-page SEO URLs attached.

use crate::context::SalesChannelContext;
use crate::criteria::{Criteria, Filter};
use crate::entity::{BlogEntry, SeoUrl};
use crate::error::AppError;
use crate::repository::{EntityRepository, EntitySearchResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Route name of the storefront blog detail page.
pub const BLOG_DETAIL_ROUTE: &str = "werkl.frontend.blog.detail";

/// Associations every listing loads.
pub const BLOG_ASSOCIATIONS: [&str; 6] = [
    "blogAuthor.salutation",
    "blogCategories",
    "tags",
    "cmsPage.sections",
    "cmsPage.sections.blocks",
    "cmsPage.sections.blocks.slots",
];

/// Parameters read from the request, independent of the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlogRequest {
    /// Entry id or slug.
    pub search: Option<String>,
}

pub type BlogRouteResponse = EntitySearchResult<BlogEntry>;

/// Replaceable blog listing route. Decorators wrap another route and return it from
/// `get_decorated`; the terminal implementation has nothing to return.
#[async_trait]
pub trait AbstractBlogRoute: Send + Sync {
    fn get_decorated(&self) -> Result<&dyn AbstractBlogRoute, AppError>;

    async fn load(
        &self,
        request: &BlogRequest,
        criteria: Criteria,
        context: &SalesChannelContext,
    ) -> Result<BlogRouteResponse, AppError>;
}

pub struct BlogRoute {
    blog_repository: Arc<dyn EntityRepository<BlogEntry>>,
    seo_url_repository: Arc<dyn EntityRepository<SeoUrl>>,
}

impl BlogRoute {
    pub fn new(
        blog_repository: Arc<dyn EntityRepository<BlogEntry>>,
        seo_url_repository: Arc<dyn EntityRepository<SeoUrl>>,
    ) -> Self {
        BlogRoute {
            blog_repository,
            seo_url_repository,
        }
    }

    /// Restrict by id when `search` is a uuid, by slug otherwise; always add the listing associations.
    pub fn build_criteria(request: &BlogRequest, mut criteria: Criteria) -> Criteria {
        if let Some(search) = request.search.as_deref().filter(|s| !s.is_empty()) {
            match Uuid::parse_str(search) {
                Ok(id) => {
                    criteria.set_ids([id.to_string()]);
                }
                Err(_) => {
                    criteria.add_filter(Filter::equals("slug", search));
                }
            }
        }
        criteria.add_associations(BLOG_ASSOCIATIONS);
        criteria
    }

    /// One search for the canonical detail URLs of all `ids`.
    async fn load_seo_urls(
        &self,
        ids: &[Uuid],
        context: &SalesChannelContext,
    ) -> Result<HashMap<Uuid, Vec<SeoUrl>>, AppError> {
        let mut criteria = Criteria::new();
        criteria
            .add_filter(Filter::equals_any("foreignKey", ids.iter().map(|id| id.to_string())))
            .add_filter(Filter::equals("routeName", BLOG_DETAIL_ROUTE))
            .add_filter(Filter::equals("isCanonical", true));
        let seo_urls = self.seo_url_repository.search(&criteria, context).await?;
        tracing::debug!(entries = ids.len(), seo_urls = seo_urls.elements.len(), "loaded blog seo urls");
        Ok(group_by_foreign_key(seo_urls.elements))
    }
}

/// Single pass; each group keeps the order the repository returned.
pub fn group_by_foreign_key(seo_urls: Vec<SeoUrl>) -> HashMap<Uuid, Vec<SeoUrl>> {
    let mut groups: HashMap<Uuid, Vec<SeoUrl>> = HashMap::new();
    for seo_url in seo_urls {
        groups.entry(seo_url.foreign_key).or_default().push(seo_url);
    }
    groups
}

#[async_trait]
impl AbstractBlogRoute for BlogRoute {
    fn get_decorated(&self) -> Result<&dyn AbstractBlogRoute, AppError> {
        Err(AppError::DecorationPattern(std::any::type_name::<Self>().to_string()))
    }

    async fn load(
        &self,
        request: &BlogRequest,
        criteria: Criteria,
        context: &SalesChannelContext,
    ) -> Result<BlogRouteResponse, AppError> {
        let criteria = Self::build_criteria(request, criteria);
        let mut result = self.blog_repository.search(&criteria, context).await?;
        if result.is_empty() {
            return Ok(result);
        }

        let ids: Vec<Uuid> = result.elements.iter().map(|e| e.id).collect();
        let mut groups = self.load_seo_urls(&ids, context).await?;
        for entry in &mut result.elements {
            entry.seo_urls = groups.remove(&entry.id).unwrap_or_default();
        }
        Ok(result)
    }
}
