//! Catalog Domain
//!
//! Structured facts about each company: identity (normalized domain key),
//! descriptive attributes, and monthly traffic metric snapshots. The catalog
//! is read-mostly; ingestion jobs upsert rows, the discovery pipeline joins
//! against it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Validation, domain normalization
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use models::{
    Company, CompanyFilter, CompanyPage, CompanyWithMetrics, MetricSnapshot, UpsertCompany,
    normalize_domain,
};
pub use postgres::PgCatalogRepository;
pub use repository::CatalogRepository;
pub use service::CatalogService;
