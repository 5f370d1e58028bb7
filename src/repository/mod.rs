//! Entity repositories: search by criteria within a sales channel context.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgEntityRepository;

use crate::context::SalesChannelContext;
use crate::criteria::Criteria;
use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// One page of matching entities plus the filtered total and requested aggregations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntitySearchResult<E> {
    pub total: u64,
    pub aggregations: Map<String, Value>,
    pub elements: Vec<E>,
}

impl<E> EntitySearchResult<E> {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[async_trait]
pub trait EntityRepository<E>: Send + Sync {
    /// Run the criteria; errors come from the data layer and are passed through unchanged.
    async fn search(
        &self,
        criteria: &Criteria,
        context: &SalesChannelContext,
    ) -> Result<EntitySearchResult<E>, AppError>;
}
