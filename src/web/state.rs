//! Application state shared across handlers

use crate::cache::SearchCache;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::knowledge::{KnowledgeBase, VectorIndex};
use crate::metrics::Metrics;
use crate::mixer::{Mixer, MixerConfig};
use crate::network::HttpClient;
use crate::providers::ProviderRegistry;
use crate::search::FanOut;
use std::sync::Arc;

/// Shared application state.
///
/// Every shared resource (embedder model, vector index handle, cache) is
/// constructed once here and injected into the components that use it.
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Provider registry
    pub registry: Arc<ProviderRegistry>,
    /// Fan-out executor
    pub fan_out: Arc<FanOut>,
    /// Knowledge-base retriever
    pub knowledge: Arc<KnowledgeBase>,
    /// Result mixer
    pub mixer: Arc<Mixer>,
    /// Metrics collector
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wire up the application from its externally constructed collaborators
    pub fn new(
        settings: Settings,
        registry: ProviderRegistry,
        client: HttpClient,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let settings = Arc::new(settings);
        let registry = Arc::new(registry);
        let metrics = Arc::new(Metrics::new());

        let cache = Arc::new(SearchCache::new(
            settings.cache.ttl_seconds,
            settings.cache.max_capacity,
        ));

        let knowledge = Arc::new(KnowledgeBase::new(
            index,
            embedder.clone(),
            cache,
            settings.knowledge.collection.clone(),
            settings.knowledge.score_threshold,
        ));

        let mixer = Arc::new(Mixer::new(embedder).with_config(MixerConfig {
            overfetch: settings.search.mix_overfetch,
        }));

        let fan_out = Arc::new(
            FanOut::new(client, registry.clone()).with_metrics(metrics.clone()),
        );

        Self {
            settings,
            registry,
            fan_out,
            knowledge,
            mixer,
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
