//! Vector Domain
//!
//! Semantic search infrastructure: embedding providers that turn text into
//! vectors, and a Qdrant-backed index that stores one point per company and
//! answers filtered nearest-neighbour queries.
//!
//! The index is the source of truth for embeddings; relational storage never
//! sees a vector.

pub mod embedding;
pub mod error;
pub mod models;
pub mod qdrant;
pub mod repository;

pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider, RetryingEmbedder};
pub use error::{VectorError, VectorResult};
pub use models::{
    CompanyPoint, EmbeddingModel, EmbeddingResult, PointPayload, SearchFilter, SearchHit,
    SearchQuery,
};
pub use qdrant::{QdrantConfig, QdrantIndex};
pub use repository::VectorIndex;
