//! In-process vector index
//!
//! Brute-force cosine search over an in-memory point list. Serves as the
//! knowledge base when no Qdrant URL is configured, and as the index used
//! in tests.

use super::index::{DocumentPoint, IndexError, IndexHit, MetadataFilter, VectorIndex};
use crate::embedding::cosine_similarity;
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory brute-force index
#[derive(Default)]
pub struct MemoryIndex {
    points: RwLock<Vec<DocumentPoint>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches_filter(point: &DocumentPoint, filter: Option<&MetadataFilter>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        filter
            .iter()
            .all(|(key, expected)| point.payload.metadata.get(key) == Some(expected))
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, points: Vec<DocumentPoint>) -> Result<(), IndexError> {
        let mut stored = self.points.write().unwrap();
        for point in points {
            stored.retain(|p| p.point_id != point.point_id);
            stored.push(point);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexHit>, IndexError> {
        let stored = self.points.read().unwrap();

        let mut hits: Vec<IndexHit> = stored
            .iter()
            .filter(|p| Self::matches_filter(p, filter))
            .map(|p| IndexHit {
                payload: p.payload.clone(),
                score: cosine_similarity(&vector, &p.vector),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit as usize);

        Ok(hits)
    }

    async fn find_text(&self, needle: &str, limit: u64) -> Result<Vec<IndexHit>, IndexError> {
        let needle = needle.to_lowercase();
        let stored = self.points.read().unwrap();

        let hits = stored
            .iter()
            .filter(|p| {
                p.payload.content.to_lowercase().contains(&needle)
                    || p.payload.title.to_lowercase().contains(&needle)
            })
            .take(limit as usize)
            .map(|p| IndexHit {
                payload: p.payload.clone(),
                score: 0.0,
            })
            .collect();

        Ok(hits)
    }

    async fn count(&self) -> Result<u64, IndexError> {
        Ok(self.points.read().unwrap().len() as u64)
    }
}
