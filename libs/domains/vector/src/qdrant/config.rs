use core_config::{env_or_default, env_parse_or_default};

use crate::error::VectorResult;

/// Qdrant connection and collection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Collection holding one point per company
    pub collection: String,
    pub dimension: u64,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_collection(mut self, collection: String) -> Self {
        self.collection = collection;
        self
    }

    pub fn with_dimension(mut self, dimension: u64) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn from_env() -> VectorResult<Self> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: std::env::var("QDRANT_API_KEY").ok(),
            timeout_secs: env_parse_or_default("QDRANT_TIMEOUT_SECS", 30)?,
            collection: env_or_default("QDRANT_COLLECTION", "companies"),
            dimension: env_parse_or_default("EMBEDDING_DIMENSION", 1536)?,
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
            collection: "companies".to_string(),
            dimension: 1536,
        }
    }
}
