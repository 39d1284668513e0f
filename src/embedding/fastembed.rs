//! ONNX embedder backed by the fastembed crate (MiniLM-L6-v2, 384-d)

use super::{Embedder, EmbeddingError, EMBEDDING_DIM};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// MiniLM-L6-v2 embedder.
///
/// The model is loaded once on first use; concurrent first callers share the
/// same initialization. Inference runs on the blocking pool.
pub struct FastEmbedder {
    model: OnceCell<Arc<TextEmbedding>>,
}

impl FastEmbedder {
    pub fn new() -> Self {
        Self {
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<TextEmbedding>, EmbeddingError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                tracing::info!("Loading embedding model: all-MiniLM-L6-v2");
                tokio::task::spawn_blocking(|| {
                    TextEmbedding::try_new(
                        InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                            .with_show_download_progress(false),
                    )
                    .map(Arc::new)
                    .map_err(|e| EmbeddingError::Model(e.to_string()))
                })
                .await
                .map_err(|e| EmbeddingError::Model(e.to_string()))?
            })
            .await?;
        Ok(model.clone())
    }
}

impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let model = self.model().await?;
        let text = text.to_string();

        let mut vectors = tokio::task::spawn_blocking(move || {
            model
                .embed(vec![text], None)
                .map_err(|e| EmbeddingError::Model(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Model(e.to_string()))??;

        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Model("model returned no vectors".to_string()))
    }
}
