//! Blog store API: blog entry listing with canonical SEO URLs, backed by PostgreSQL.

pub mod case;
pub mod context;
pub mod criteria;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use context::SalesChannelContext;
pub use criteria::{Aggregation, AggregationKind, Criteria, Filter};
pub use entity::{BlogEntry, SeoUrl};
pub use error::{AppError, ConfigError, SchemaError};
pub use repository::{EntityRepository, EntitySearchResult, InMemoryRepository, PgEntityRepository};
pub use response::ListingResponse;
pub use routes::{app, common_routes, store_api_routes};
pub use service::{AbstractBlogRoute, BlogRequest, BlogRoute};
pub use settings::Settings;
pub use state::AppState;
