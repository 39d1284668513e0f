//! Provider loader for initializing providers from configuration

use super::registry::ProviderRegistry;
use super::traits::Provider;
use super::{duckduckgo, google, serpapi, tavily};
use crate::config::{ProviderConfig, Settings};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Loader for initializing providers from configuration.
///
/// A provider whose credentials are absent is skipped silently (logged, not
/// an error): enablement is derived once from configuration at startup.
pub struct ProviderLoader;

impl ProviderLoader {
    /// Load all enabled providers from settings
    pub fn load(settings: &Settings) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();

        for config in &settings.providers {
            if config.disabled {
                info!("Skipping disabled provider: {}", config.name);
                continue;
            }

            match Self::create_provider(&config.provider, config) {
                Some(provider) => {
                    info!("Search provider enabled: {}", config.name);
                    registry.register(provider, config.clone());
                }
                None => {
                    info!(
                        "Search provider {} not configured (missing credentials), skipping",
                        config.name
                    );
                }
            }
        }

        info!("Loaded {} search providers", registry.len());
        Ok(registry)
    }

    /// Create a provider instance by kind; `None` when credentials are missing
    fn create_provider(kind: &str, config: &ProviderConfig) -> Option<Arc<dyn Provider>> {
        match kind {
            "duckduckgo" => Some(Arc::new(duckduckgo::DuckDuckGo::new())),
            "google" => {
                let api_key = config.api_key.clone()?;
                let engine_id = config.engine_id.clone()?;
                Some(Arc::new(google::Google::new(api_key, engine_id)))
            }
            "tavily" => {
                let api_key = config.api_key.clone()?;
                Some(Arc::new(tavily::Tavily::new(api_key)))
            }
            "serpapi" => {
                let api_key = config.api_key.clone()?;
                Some(Arc::new(serpapi::SerpApi::new(api_key)))
            }
            _ => {
                tracing::warn!("Unknown provider kind: {}", kind);
                None
            }
        }
    }

    /// Get list of available provider kinds
    pub fn available_providers() -> Vec<&'static str> {
        vec!["duckduckgo", "google", "tavily", "serpapi"]
    }
}
