//! Knowledge-base retrieval module
//!
//! Semantic and text search over the persisted document store, plus document
//! ingestion (chunk, embed, upsert).

mod chunk;
mod index;
mod memory;
mod qdrant;

pub use chunk::chunk_text;
pub use index::{DocumentPayload, DocumentPoint, IndexError, IndexHit, MetadataFilter, VectorIndex};
pub use memory::MemoryIndex;
pub use qdrant::QdrantIndex;

use crate::cache::{text_search_key, SearchCache};
use crate::embedding::{Embedder, EmbeddingError};
use crate::results::SearchResult;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Source label on knowledge-base results
pub const KNOWLEDGE_SOURCE: &str = "KnowledgeBase";

/// Fixed relevance score for plain text matches
const TEXT_MATCH_SCORE: f32 = 0.8;

/// Chunking window in words
const CHUNK_SIZE: usize = 500;
/// Words shared between consecutive chunks
const CHUNK_OVERLAP: usize = 50;

/// Errors from knowledge-base operations
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Summary returned after ingesting a document
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexedDocument {
    pub doc_id: i64,
    pub chunks_count: usize,
    pub content_length: usize,
}

/// Knowledge-base statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct KnowledgeStats {
    pub collection: String,
    pub points_count: u64,
    pub vector_size: usize,
    pub distance: &'static str,
}

/// Retriever over the persisted document store.
///
/// Holds the shared embedder and vector index handles; both are initialized
/// once at startup and only read afterwards.
pub struct KnowledgeBase {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    cache: Arc<SearchCache>,
    collection: String,
    score_threshold: f32,
    next_doc_id: AtomicI64,
}

impl KnowledgeBase {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        cache: Arc<SearchCache>,
        collection: impl Into<String>,
        score_threshold: f32,
    ) -> Self {
        Self {
            index,
            embedder,
            cache,
            collection: collection.into(),
            score_threshold,
            next_doc_id: AtomicI64::new(1),
        }
    }

    /// Collection name this knowledge base reads from
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Default minimum similarity score
    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    /// Semantic search over the document store.
    ///
    /// Fetches twice the requested limit from the index, drops hits under the
    /// threshold, and keeps only the highest-scoring chunk per document so a
    /// single long document cannot crowd out the rest of the result set.
    pub async fn semantic_search(
        &self,
        query: &str,
        limit: usize,
        score_threshold: Option<f32>,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, KnowledgeError> {
        let threshold = score_threshold.unwrap_or(self.score_threshold);
        let vector = self.embedder.embed(query).await?;

        let mut hits = self
            .index
            .query(vector, (limit * 2) as u64, threshold, filter)
            .await?;
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut seen_docs = HashSet::new();
        let mut results = Vec::new();

        for hit in hits {
            if !seen_docs.insert(hit.payload.doc_id) {
                continue;
            }

            results.push(
                SearchResult::new(
                    hit.payload.title,
                    "",
                    hit.payload.content,
                    KNOWLEDGE_SOURCE,
                )
                .with_rank(results.len() as u32 + 1)
                .with_score(hit.score)
                .with_doc_id(hit.payload.doc_id),
            );

            if results.len() >= limit {
                break;
            }
        }

        debug!(
            "Semantic search for '{}' returned {} results",
            query,
            results.len()
        );
        Ok(results)
    }

    /// Text containment search, memoized by collection + query.
    ///
    /// Returns the results and whether they came from the cache.
    pub async fn text_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<(Vec<SearchResult>, bool), KnowledgeError> {
        let key = text_search_key(&self.collection, query);

        if let Some(results) = self.cache.get_results(&key).await {
            debug!("Cache hit for text query: {}", query);
            return Ok((results, true));
        }

        let hits = self.index.find_text(query, limit as u64).await?;

        let results: Vec<SearchResult> = hits
            .into_iter()
            .enumerate()
            .map(|(idx, hit)| {
                SearchResult::new(hit.payload.title, "", hit.payload.content, KNOWLEDGE_SOURCE)
                    .with_rank(idx as u32 + 1)
                    .with_score(TEXT_MATCH_SCORE)
                    .with_doc_id(hit.payload.doc_id)
            })
            .collect();

        if !results.is_empty() {
            self.cache.put_results(key, &results).await;
        }

        Ok((results, false))
    }

    /// Chunk, embed, and store a document.
    ///
    /// Overwrites any previously stored chunks with the same ids, so
    /// re-ingesting a document refreshes it in place.
    pub async fn index_document(
        &self,
        title: &str,
        content: &str,
        metadata: serde_json::Value,
        doc_id: Option<i64>,
    ) -> Result<IndexedDocument, KnowledgeError> {
        let doc_id = doc_id.unwrap_or_else(|| self.next_doc_id.fetch_add(1, Ordering::SeqCst));

        let chunks = chunk_text(content, CHUNK_SIZE, CHUNK_OVERLAP);
        info!("Document {} split into {} chunks", doc_id, chunks.len());

        let created_at = chrono::Utc::now().to_rfc3339();
        let mut points = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.iter().enumerate() {
            let vector = self.embedder.embed(chunk).await?;
            points.push(DocumentPoint {
                point_id: point_id(doc_id, idx as u32),
                vector,
                payload: DocumentPayload {
                    doc_id,
                    chunk_id: idx as u32,
                    title: title.to_string(),
                    content: chunk.clone(),
                    metadata: metadata.clone(),
                    created_at: created_at.clone(),
                },
            });
        }

        let chunks_count = points.len();
        if !points.is_empty() {
            self.index.upsert(points).await?;
        }
        info!("Stored {} vectors for document {}", chunks_count, doc_id);

        Ok(IndexedDocument {
            doc_id,
            chunks_count,
            content_length: content.len(),
        })
    }

    /// Statistics about the vector collection
    pub async fn stats(&self) -> Result<KnowledgeStats, KnowledgeError> {
        Ok(KnowledgeStats {
            collection: self.collection.clone(),
            points_count: self.index.count().await?,
            vector_size: self.embedder.dimension(),
            distance: "cosine",
        })
    }
}

/// Stable point id derived from document and chunk ids
fn point_id(doc_id: i64, chunk_id: u32) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(doc_id.to_le_bytes());
    hasher.update(b"_");
    hasher.update(chunk_id.to_le_bytes());

    let digest = hasher.finalize();
    u64::from_le_bytes(digest[..8].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn knowledge_base() -> KnowledgeBase {
        KnowledgeBase::new(
            Arc::new(MemoryIndex::new()),
            Arc::new(HashEmbedder::new()),
            Arc::new(SearchCache::default()),
            "documents",
            0.0,
        )
    }

    #[tokio::test]
    async fn test_index_and_search_roundtrip() {
        let kb = knowledge_base();
        kb.index_document(
            "Rust Guide",
            "Rust is a systems programming language focused on memory safety",
            serde_json::json!({}),
            None,
        )
        .await
        .unwrap();

        let results = kb
            .semantic_search("rust memory safety", 5, None, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, KNOWLEDGE_SOURCE);
        assert!(results[0].url.is_empty());
        assert_eq!(results[0].doc_id, Some(1));
    }

    #[tokio::test]
    async fn test_per_document_dedup_keeps_best_chunk() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new());
        let index = Arc::new(MemoryIndex::new());

        // Three chunks of one document with staggered similarity to the query
        let query_vec = embedder.embed("target phrase").await.unwrap();
        let mut points = Vec::new();
        for (chunk_id, drift) in [(0u32, 0.0f32), (1, 0.4), (2, 0.8)] {
            let mut vector = query_vec.clone();
            vector[0] += drift;
            points.push(DocumentPoint {
                point_id: chunk_id as u64,
                vector,
                payload: DocumentPayload {
                    doc_id: 42,
                    chunk_id,
                    title: "Doc".to_string(),
                    content: format!("chunk {}", chunk_id),
                    metadata: serde_json::Value::Null,
                    created_at: String::new(),
                },
            });
        }
        index.upsert(points).await.unwrap();

        let kb = KnowledgeBase::new(
            index,
            embedder,
            Arc::new(SearchCache::default()),
            "documents",
            0.0,
        );

        let results = kb
            .semantic_search("target phrase", 5, None, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_id, Some(42));
        // The undrifted chunk is the best match
        assert_eq!(results[0].snippet, "chunk 0");
    }

    #[tokio::test]
    async fn test_text_search_uses_cache_on_second_call() {
        let kb = knowledge_base();
        kb.index_document(
            "Platform Overview",
            "The platform supports enterprise RAG capabilities",
            serde_json::json!({}),
            None,
        )
        .await
        .unwrap();

        let (first, cached_first) = kb.text_search("enterprise rag", 5).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(!cached_first);
        assert_eq!(first[0].score, Some(TEXT_MATCH_SCORE));

        let (second, cached_second) = kb.text_search("enterprise rag", 5).await.unwrap();
        assert_eq!(second.len(), 1);
        assert!(cached_second);
    }

    #[tokio::test]
    async fn test_doc_ids_are_assigned_sequentially() {
        let kb = knowledge_base();
        let first = kb
            .index_document("A", "alpha body", serde_json::json!({}), None)
            .await
            .unwrap();
        let second = kb
            .index_document("B", "beta body", serde_json::json!({}), None)
            .await
            .unwrap();

        assert_eq!(first.doc_id, 1);
        assert_eq!(second.doc_id, 2);
    }

    #[test]
    fn test_point_id_is_stable() {
        assert_eq!(point_id(1, 0), point_id(1, 0));
        assert_ne!(point_id(1, 0), point_id(1, 1));
        assert_ne!(point_id(1, 0), point_id(2, 0));
    }
}
