//! HTTP handlers for the store API.

pub mod blog;
pub use blog::*;
