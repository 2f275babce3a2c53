use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedding model family; the index dimension must match the model's output
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingModel {
    TextEmbedding3Small,
    TextEmbedding3Large,
    Custom { name: String, dimension: u64 },
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u64 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::Custom { dimension, .. } => *dimension,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::Custom { name, .. } => name,
        }
    }
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        EmbeddingModel::TextEmbedding3Small
    }
}

/// One embedding with provider bookkeeping
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u64,
    pub tokens_used: u32,
}

/// Payload stored alongside each point, mirrored from the catalog so filters
/// can be pushed down into the index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointPayload {
    /// The exact text the vector was computed from
    pub source_text: String,
    pub visits: Option<f64>,
    pub country: Option<String>,
    pub industry: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One company's point in the index
#[derive(Debug, Clone)]
pub struct CompanyPoint {
    pub company_id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// Structured constraints applied inside the index, before ranking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub min_visits: Option<f64>,
    pub country: Option<String>,
    pub industry: Option<String>,
    /// Every listed tag must be present on the point
    pub tags: Vec<String>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.min_visits.is_none()
            && self.country.is_none()
            && self.industry.is_none()
            && self.tags.is_empty()
    }
}

/// A nearest-neighbour query against the index
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub filter: SearchFilter,
    /// Number of candidates to return, applied after filtering
    pub limit: u64,
}

/// One ranked result; lower distance means more similar
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub company_id: Uuid,
    /// Cosine distance in [0, 2], derived from the index similarity score
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dimensions() {
        assert_eq!(EmbeddingModel::TextEmbedding3Small.dimension(), 1536);
        assert_eq!(EmbeddingModel::TextEmbedding3Large.dimension(), 3072);
        let custom = EmbeddingModel::Custom {
            name: "local-minilm".to_string(),
            dimension: 384,
        };
        assert_eq!(custom.dimension(), 384);
        assert_eq!(custom.model_name(), "local-minilm");
    }

    #[test]
    fn test_filter_is_empty() {
        assert!(SearchFilter::default().is_empty());
        assert!(
            !SearchFilter {
                min_visits: Some(100.0),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
