//! Qdrant-backed vector index

use super::index::{DocumentPayload, DocumentPoint, IndexError, IndexHit, MetadataFilter, VectorIndex};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter,
    PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use tracing::info;

/// Vector index backed by a Qdrant collection (cosine distance)
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantIndex {
    /// Connect to Qdrant and ensure the collection exists.
    ///
    /// Collection creation is idempotent; an existing collection is reused.
    pub async fn connect(
        url: &str,
        collection: impl Into<String>,
        vector_size: u64,
    ) -> Result<Self, IndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        let index = Self {
            client,
            collection: collection.into(),
        };
        index.ensure_collection(vector_size).await?;
        Ok(index)
    }

    async fn ensure_collection(&self, vector_size: u64) -> Result<(), IndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        if exists {
            info!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        info!("Creating collection '{}'", self.collection);
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
            )
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        Ok(())
    }

    fn metadata_conditions(filter: &MetadataFilter) -> Vec<Condition> {
        filter
            .iter()
            .map(|(key, value)| {
                let field = format!("metadata.{}", key);
                match value {
                    serde_json::Value::Bool(b) => Condition::matches(field, *b),
                    serde_json::Value::Number(n) if n.is_i64() => {
                        Condition::matches(field, n.as_i64().unwrap())
                    }
                    serde_json::Value::String(s) => Condition::matches(field, s.clone()),
                    other => Condition::matches(field, other.to_string()),
                }
            })
            .collect()
    }

    fn parse_payload(payload: &HashMap<String, Value>) -> Result<DocumentPayload, IndexError> {
        let json = serde_json::Value::Object(
            payload
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        );
        serde_json::from_value(json).map_err(|e| IndexError::Backend(e.to_string()))
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn upsert(&self, points: Vec<DocumentPoint>) -> Result<(), IndexError> {
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| -> Result<PointStruct, IndexError> {
                let payload = Payload::try_from(
                    serde_json::to_value(&p.payload)
                        .map_err(|e| IndexError::Backend(e.to_string()))?,
                )
                .map_err(|e| IndexError::Backend(e.to_string()))?;
                Ok(PointStruct::new(p.point_id, p.vector, payload))
            })
            .collect::<Result<_, IndexError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexHit>, IndexError> {
        let mut search = SearchPointsBuilder::new(&self.collection, vector, limit)
            .with_payload(true)
            .score_threshold(score_threshold);

        if let Some(filter) = filter {
            if !filter.is_empty() {
                search = search.filter(Filter::must(Self::metadata_conditions(filter)));
            }
        }

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        let mut hits = Vec::with_capacity(response.result.len());
        for point in &response.result {
            hits.push(IndexHit {
                payload: Self::parse_payload(&point.payload)?,
                score: point.score,
            });
        }

        Ok(hits)
    }

    async fn find_text(&self, needle: &str, limit: u64) -> Result<Vec<IndexHit>, IndexError> {
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection)
                    .filter(Filter::must([Condition::matches_text("content", needle)]))
                    .limit(limit as u32)
                    .with_payload(true),
            )
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        let mut hits = Vec::with_capacity(response.result.len());
        for point in &response.result {
            hits.push(IndexHit {
                payload: Self::parse_payload(&point.payload)?,
                score: 0.0,
            });
        }

        Ok(hits)
    }

    async fn count(&self) -> Result<u64, IndexError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}

/// Convert a Qdrant payload value into JSON
fn value_to_json(value: &Value) -> serde_json::Value {
    match &value.kind {
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(*i),
        Some(Kind::DoubleValue(d)) => serde_json::Value::from(*d),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(obj)) => serde_json::Value::Object(
            obj.fields
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}
