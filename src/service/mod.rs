//! Store API routes.

pub mod blog;

pub use blog::{AbstractBlogRoute, BlogRequest, BlogRoute, BlogRouteResponse};
