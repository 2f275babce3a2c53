//! Discovery Domain
//!
//! The search pipeline callers interact with: a natural-language prompt plus
//! structured filters in, a ranked page of companies out. The orchestrator
//! embeds the prompt, runs a filtered nearest-neighbour query with an
//! over-fetch margin, joins candidates against the catalog, drops companies
//! already on excluded outreach lists, and paginates.
//!
//! Promptless requests skip the vector index entirely and fall back to a
//! structured catalog query, so companies without embeddings stay reachable.

pub mod error;
pub mod models;
pub mod service;

pub use error::{DiscoveryError, DiscoveryResult};
pub use models::{DiscoveredCompany, DiscoveryConfig, SearchFilters, SearchPage, SearchRequest};
pub use service::DiscoveryOrchestrator;
