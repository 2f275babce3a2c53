use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Company, CompanyFilter, CompanyPage, MetricSnapshot, UpsertCompany, normalize_domain,
};
use crate::repository::CatalogRepository;

/// Catalog service - validation and domain normalization over the repository
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, input), fields(domain = %input.domain))]
    pub async fn upsert_company(&self, mut input: UpsertCompany) -> CatalogResult<Company> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;
        input.domain = normalize_domain(&input.domain)?;

        let company = self.repository.upsert(input).await?;
        info!(company_id = %company.id, "Company upserted");
        Ok(company)
    }

    #[instrument(skip(self))]
    pub async fn get_company(&self, id: Uuid) -> CatalogResult<Company> {
        self.repository
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_company_by_domain(&self, domain: &str) -> CatalogResult<Company> {
        let normalized = normalize_domain(domain)?;
        self.repository
            .get_by_domain(&normalized)
            .await?
            .ok_or(CatalogError::DomainNotFound(normalized))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_companies(&self, ids: &[Uuid]) -> CatalogResult<Vec<Company>> {
        self.repository.get_many(ids).await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn latest_metrics(&self, ids: &[Uuid]) -> CatalogResult<Vec<MetricSnapshot>> {
        self.repository.latest_metrics(ids).await
    }

    #[instrument(skip(self, snapshots), fields(count = snapshots.len()))]
    pub async fn record_metrics(&self, snapshots: Vec<MetricSnapshot>) -> CatalogResult<u64> {
        let written = self.repository.upsert_metrics(snapshots).await?;
        info!(written, "Metric snapshots recorded");
        Ok(written)
    }

    #[instrument(skip(self, filter))]
    pub async fn list_companies(&self, filter: &CompanyFilter) -> CatalogResult<CompanyPage> {
        if filter.limit == 0 || filter.limit > 500 {
            return Err(CatalogError::Validation(
                "limit must be between 1 and 500".to_string(),
            ));
        }
        self.repository.list(filter).await
    }
}
