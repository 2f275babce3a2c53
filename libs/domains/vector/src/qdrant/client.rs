use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointId,
    PointStruct, Range, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{CompanyPoint, PointPayload, SearchFilter, SearchHit, SearchQuery};
use crate::repository::VectorIndex;

/// Qdrant-backed implementation of the company vector index
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    dimension: u64,
}

impl QdrantIndex {
    pub fn new(config: QdrantConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| VectorError::Index(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            collection: config.collection,
            dimension: config.dimension,
        })
    }

    pub fn from_client(client: Qdrant, collection: String, dimension: u64) -> Self {
        Self {
            client,
            collection,
            dimension,
        }
    }

    fn uuid_to_point_id(id: Uuid) -> PointId {
        PointId::from(id.to_string())
    }

    fn point_id_to_uuid(point_id: &PointId) -> VectorResult<Uuid> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str)
                .map_err(|e| VectorError::Index(format!("Invalid point UUID: {}", e))),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(Uuid::from_u128(*num as u128)),
            None => Err(VectorError::Index("Missing point ID".to_string())),
        }
    }

    fn payload_to_qdrant(payload: &PointPayload) -> HashMap<String, QdrantValue> {
        let mut result = HashMap::new();

        result.insert(
            "source_text".to_string(),
            QdrantValue::from(payload.source_text.clone()),
        );
        if let Some(visits) = payload.visits {
            result.insert("visits".to_string(), QdrantValue::from(visits));
        }
        if let Some(country) = &payload.country {
            result.insert("country".to_string(), QdrantValue::from(country.clone()));
        }
        if let Some(industry) = &payload.industry {
            result.insert("industry".to_string(), QdrantValue::from(industry.clone()));
        }
        if !payload.tags.is_empty() {
            let tags: Vec<QdrantValue> = payload
                .tags
                .iter()
                .map(|t| QdrantValue::from(t.clone()))
                .collect();
            result.insert("tags".to_string(), QdrantValue::from(tags));
        }

        result
    }

    fn to_point(point: CompanyPoint) -> PointStruct {
        PointStruct::new(
            Self::uuid_to_point_id(point.company_id),
            point.vector,
            Self::payload_to_qdrant(&point.payload),
        )
    }

    fn check_dimension(&self, vector: &[f32]) -> VectorResult<()> {
        if vector.len() as u64 != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len() as u64,
            });
        }
        Ok(())
    }
}

/// Dense vector size a collection was created with, if it has one
fn configured_dimension(info: &qdrant::GetCollectionInfoResponse) -> Option<u64> {
    let params = info
        .result
        .as_ref()?
        .config
        .as_ref()?
        .params
        .as_ref()?
        .vectors_config
        .as_ref()?
        .config
        .as_ref()?;

    match params {
        qdrant::vectors_config::Config::Params(params) => Some(params.size),
        qdrant::vectors_config::Config::ParamsMap(_) => None,
    }
}

/// Translate structured constraints into a Qdrant filter pushed into the
/// search itself, so ranking only ever sees qualifying points.
fn build_filter(filter: &SearchFilter) -> Option<Filter> {
    if filter.is_empty() {
        return None;
    }

    let mut must = Vec::new();

    if let Some(min_visits) = filter.min_visits {
        must.push(Condition::range(
            "visits",
            Range {
                gte: Some(min_visits),
                ..Default::default()
            },
        ));
    }
    if let Some(country) = &filter.country {
        must.push(Condition::matches("country", country.clone()));
    }
    if let Some(industry) = &filter.industry {
        must.push(Condition::matches("industry", industry.clone()));
    }
    for tag in &filter.tags {
        must.push(Condition::matches("tags", tag.clone()));
    }

    Some(Filter::must(must))
}

/// Convert similarity scores to distances and apply the deterministic
/// (distance, company id) ordering.
fn rank_hits(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.company_id.cmp(&b.company_id))
    });
    hits
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn ensure_collection(&self) -> VectorResult<()> {
        if self.client.collection_exists(&self.collection).await? {
            let info = self.client.collection_info(&self.collection).await?;
            return match configured_dimension(&info) {
                Some(size) if size == self.dimension => Ok(()),
                Some(size) => Err(VectorError::DimensionMismatch {
                    expected: self.dimension,
                    actual: size,
                }),
                None => Err(VectorError::Index(format!(
                    "Collection {} has no dense vector config",
                    self.collection
                ))),
            };
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension, Distance::Cosine),
                ),
            )
            .await?;

        info!(
            collection = %self.collection,
            dimension = self.dimension,
            "Created vector collection"
        );
        Ok(())
    }

    #[instrument(skip(self, point), fields(company_id = %point.company_id))]
    async fn upsert(&self, point: CompanyPoint) -> VectorResult<()> {
        self.check_dimension(&point.vector)?;

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(&self.collection, vec![Self::to_point(point)]).wait(true),
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self, points), fields(count = points.len()))]
    async fn upsert_batch(&self, points: Vec<CompanyPoint>) -> VectorResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        for point in &points {
            self.check_dimension(&point.vector)?;
        }

        let points: Vec<PointStruct> = points.into_iter().map(Self::to_point).collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;

        Ok(())
    }

    #[instrument(skip(self, query), fields(limit = query.limit))]
    async fn search(&self, query: &SearchQuery) -> VectorResult<Vec<SearchHit>> {
        self.check_dimension(&query.vector)?;

        let mut builder =
            SearchPointsBuilder::new(&self.collection, query.vector.clone(), query.limit)
                .with_payload(false);

        if let Some(filter) = build_filter(&query.filter) {
            builder = builder.filter(filter);
        }

        let results = self.client.search_points(builder).await?;

        let hits = results
            .result
            .into_iter()
            .map(|point| {
                let company_id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_uuid)
                    .transpose()?
                    .ok_or_else(|| VectorError::Index("Missing point ID".to_string()))?;

                // Cosine similarity in [-1, 1]; distance is its complement.
                Ok(SearchHit {
                    company_id,
                    distance: 1.0 - point.score,
                })
            })
            .collect::<VectorResult<Vec<_>>>()?;

        Ok(rank_hits(hits))
    }

    #[instrument(skip(self))]
    async fn delete(&self, company_id: Uuid) -> VectorResult<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(vec![Self::uuid_to_point_id(company_id)])
                    .wait(true),
            )
            .await?;

        Ok(())
    }
}
