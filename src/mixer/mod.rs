//! Result mixing and ranking
//!
//! Combines web provider results with knowledge-base results into a single
//! ranked list. This is a pure transform over two already-fetched lists; the
//! only internal asynchrony is the best-effort embedding of web snippets.

use crate::embedding::{cosine_similarity, similarity_to_score, Embedder};
use crate::results::{FanOutResponse, MixedResultSet, ResultOrigin, SearchResult};
use crate::search::SearchQuery;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Mixer configuration
#[derive(Debug, Clone, Default)]
pub struct MixerConfig {
    /// Override for the truncation multiplier; `None` keeps
    /// `max_results * contributing_source_kinds`
    pub overfetch: Option<usize>,
}

/// Combines and ranks web and knowledge-base results
pub struct Mixer {
    embedder: Arc<dyn Embedder>,
    config: MixerConfig,
}

impl Mixer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            config: MixerConfig::default(),
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: MixerConfig) -> Self {
        self.config = config;
        self
    }

    /// Mix web and knowledge-base results into one ranked, bounded list.
    ///
    /// With `use_rag` off this is a cheap truncation of the web results and
    /// the embedder is never consulted. This method cannot fail; every
    /// degradation inside it is logged and absorbed.
    pub async fn mix(
        &self,
        query: &SearchQuery,
        web: FanOutResponse,
        kb_results: Vec<SearchResult>,
    ) -> MixedResultSet {
        let providers_used = web.providers_used.clone();

        if !query.use_rag {
            let mut results = web.results;
            results.truncate(query.max_results);
            let web_count = results.len();

            return MixedResultSet {
                results,
                providers_used,
                web_count,
                knowledge_count: 0,
                rag_enabled: false,
                mixed_with_documents: false,
            };
        }

        let web_results = self.rescore_web(query, web.results).await;

        let mut merged: Vec<SearchResult> = web_results
            .iter()
            .map(|r| r.tagged(ResultOrigin::Web))
            .collect();

        let mixing_documents = query.mix_with_documents;
        if mixing_documents {
            merged.extend(kb_results.iter().map(|r| r.tagged(ResultOrigin::Document)));
        } else if !kb_results.is_empty() {
            debug!(
                "Dropping {} knowledge-base results, document mixing disabled",
                kb_results.len()
            );
        }

        // Stable sort: un-scored results rank at the neutral score and ties
        // keep their original relative order.
        merged.sort_by(|a, b| {
            b.effective_score()
                .partial_cmp(&a.effective_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let source_kinds = if mixing_documents { 2 } else { 1 };
        let limit = query.max_results * self.config.overfetch.unwrap_or(source_kinds);
        merged.truncate(limit);

        let web_count = merged
            .iter()
            .filter(|r| r.origin == Some(ResultOrigin::Web))
            .count();
        let knowledge_count = merged.len() - web_count;

        MixedResultSet {
            results: merged,
            providers_used,
            web_count,
            knowledge_count,
            rag_enabled: true,
            mixed_with_documents: mixing_documents,
        }
    }

    /// Best-effort embedding re-score of web results.
    ///
    /// Snippets are embedded concurrently; a failed embedding leaves that
    /// result without a score (it will rank at the neutral default). Results
    /// that already carry a provider score keep it.
    async fn rescore_web(
        &self,
        query: &SearchQuery,
        web_results: Vec<SearchResult>,
    ) -> Vec<SearchResult> {
        let query_vector = match self.embedder.embed(&query.text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Query embedding failed, skipping re-score: {}", e);
                return web_results;
            }
        };

        let futures = web_results.iter().map(|result| {
            let embedder = self.embedder.clone();
            let query_vector = &query_vector;
            async move {
                if result.score.is_some() || result.snippet.is_empty() {
                    return None;
                }
                match embedder.embed(&result.snippet).await {
                    Ok(vector) => {
                        Some(similarity_to_score(cosine_similarity(query_vector, &vector)))
                    }
                    Err(e) => {
                        debug!("Snippet embedding failed, using neutral score: {}", e);
                        None
                    }
                }
            }
        });

        let scores = join_all(futures).await;

        web_results
            .into_iter()
            .zip(scores)
            .map(|(result, score)| match score {
                Some(score) => result.with_score(score),
                None => result,
            })
            .collect()
    }
}
