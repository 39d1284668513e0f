//! Vector index abstraction
//!
//! The knowledge base talks to its index through this trait; the backends
//! are a Qdrant collection and an in-process brute-force index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Metadata equality conditions, all of which must match
pub type MetadataFilter = HashMap<String, serde_json::Value>;

/// Errors from the vector index backend
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector index error: {0}")]
    Backend(String),
}

/// Payload stored with each chunk vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub doc_id: i64,
    pub chunk_id: u32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: String,
}

/// A chunk vector plus payload, ready for upsert
#[derive(Debug, Clone)]
pub struct DocumentPoint {
    pub point_id: u64,
    pub vector: Vec<f32>,
    pub payload: DocumentPayload,
}

/// A search hit returned by the index
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub payload: DocumentPayload,
    pub score: f32,
}

/// Similarity-search index over document chunks.
///
/// Read paths are safe for concurrent use; writes are idempotent per
/// `point_id` (last write wins).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite chunk points
    async fn upsert(&self, points: Vec<DocumentPoint>) -> Result<(), IndexError>;

    /// Nearest-neighbor search, filtered by minimum score and optional
    /// metadata conditions, ordered by descending similarity
    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexHit>, IndexError>;

    /// Plain text containment search over chunk content
    async fn find_text(&self, needle: &str, limit: u64) -> Result<Vec<IndexHit>, IndexError>;

    /// Number of stored points
    async fn count(&self) -> Result<u64, IndexError>;
}
