use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{Company, CompanyFilter, CompanyPage, MetricSnapshot, UpsertCompany};

/// Repository trait for catalog persistence operations
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a company or refresh its attributes, keyed by domain
    async fn upsert(&self, input: UpsertCompany) -> CatalogResult<Company>;

    async fn get(&self, id: Uuid) -> CatalogResult<Option<Company>>;

    async fn get_by_domain(&self, domain: &str) -> CatalogResult<Option<Company>>;

    /// Fetch a batch of companies by id; missing ids are silently skipped
    async fn get_many(&self, ids: &[Uuid]) -> CatalogResult<Vec<Company>>;

    /// Latest worldwide metric snapshot per company, newest month wins
    async fn latest_metrics(&self, ids: &[Uuid]) -> CatalogResult<Vec<MetricSnapshot>>;

    async fn upsert_metrics(&self, snapshots: Vec<MetricSnapshot>) -> CatalogResult<u64>;

    /// Structured catalog query ordered by latest worldwide visits, descending
    async fn list(&self, filter: &CompanyFilter) -> CatalogResult<CompanyPage>;
}
