use async_trait::async_trait;
use uuid::Uuid;

use crate::error::VectorResult;
use crate::models::{CompanyPoint, SearchHit, SearchQuery};

/// Abstraction over the vector index backend
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist; verifies dimension otherwise
    async fn ensure_collection(&self) -> VectorResult<()>;

    /// Write one point, replacing any previous vector for the same company
    async fn upsert(&self, point: CompanyPoint) -> VectorResult<()>;

    async fn upsert_batch(&self, points: Vec<CompanyPoint>) -> VectorResult<()>;

    /// Filtered nearest-neighbour search, ranked by (distance, company id)
    async fn search(&self, query: &SearchQuery) -> VectorResult<Vec<SearchHit>>;

    async fn delete(&self, company_id: Uuid) -> VectorResult<()>;
}
