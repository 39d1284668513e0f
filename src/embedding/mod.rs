//! Text embedding module
//!
//! The mixer and the knowledge base consume embeddings through the
//! [`Embedder`] trait; which model sits behind it is a deployment choice.
//! The default [`HashEmbedder`] is a deterministic token-hash embedder that
//! needs no model downloads; the `fastembed` cargo feature adds an ONNX
//! MiniLM embedder with the same 384-wide output.

#[cfg(feature = "fastembed")]
mod fastembed;

#[cfg(feature = "fastembed")]
pub use self::fastembed::FastEmbedder;

use async_trait::async_trait;
use thiserror::Error;

/// Embedding vector width shared by all embedders
pub const EMBEDDING_DIM: usize = 384;

/// Errors from embedding generation
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty input")]
    EmptyInput,
    #[error("embedding model error: {0}")]
    Model(String),
}

/// Turns text into a fixed-length vector.
///
/// Implementations are deterministic for identical input and initialize any
/// underlying model lazily on first use; redundant initialization is safe.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Output vector width
    fn dimension(&self) -> usize;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Deterministic FNV-1a token-hash embedder.
///
/// Tokens and adjacent token pairs are hashed into signed buckets and the
/// vector is L2-normalized. Captures word overlap rather than semantics;
/// needs no model files.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
        }
    }

    /// Create with a custom vector width
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut vector = vec![0.0f32; self.dimension];

        let mut accumulate = |term: &str| {
            let hash = fnv1a(term.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash & (1u64 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        };

        for token in &tokens {
            accumulate(token);
        }
        for pair in tokens.windows(2) {
            accumulate(&format!("{} {}", pair[0], pair[1]));
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Err(EmbeddingError::Model(
                "degenerate zero-norm embedding".to_string(),
            ));
        }
        for v in vector.iter_mut() {
            *v /= norm;
        }

        Ok(vector)
    }
}

/// FNV-1a hash
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Map cosine similarity from [-1, 1] onto the [0, 1] score scale the
/// vector index uses, so mixed results rank on one axis.
pub fn similarity_to_score(cosine: f32) -> f32 {
    ((1.0 + cosine) / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("rust async runtime").await.unwrap();
        let b = embedder.embed("rust async runtime").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_hash_embedder_rejects_empty_input() {
        let embedder = HashEmbedder::new();
        assert!(matches!(
            embedder.embed("   ").await,
            Err(EmbeddingError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_identical_text_has_max_similarity() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("vector databases").await.unwrap();
        let b = embedder.embed("vector databases").await.unwrap();
        let cos = cosine_similarity(&a, &b);
        assert!((cos - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_related_text_scores_above_unrelated() {
        let embedder = HashEmbedder::new();
        let query = embedder.embed("rust memory safety").await.unwrap();
        let related = embedder.embed("memory safety in rust programs").await.unwrap();
        let unrelated = embedder.embed("banana bread recipe").await.unwrap();

        assert!(
            cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated)
        );
    }

    #[test]
    fn test_similarity_to_score_bounds() {
        assert_eq!(similarity_to_score(1.0), 1.0);
        assert_eq!(similarity_to_score(-1.0), 0.0);
        assert_eq!(similarity_to_score(0.0), 0.5);
    }
}
