use domain_catalog::CatalogError;
use domain_outreach::OutreachError;
use domain_vector::VectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Embedding generation failed; the search is fatal, never degraded
    /// to an empty result
    #[error("Embedding provider error: {0}")]
    Provider(#[source] VectorError),

    #[error("Vector index error: {0}")]
    Index(#[source] VectorError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Outreach(#[from] OutreachError),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
