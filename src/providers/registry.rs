//! Provider registry for managing configured search providers

use super::traits::Provider;
use crate::config::ProviderConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of all configured search providers.
///
/// Populated once by the loader at startup and read-only afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Providers by name, in registration order
    providers: HashMap<String, Arc<dyn Provider>>,
    /// Registration order (providers are invoked in this order)
    order: Vec<String>,
    /// Provider configurations
    configs: HashMap<String, ProviderConfig>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    pub fn register(&mut self, provider: Arc<dyn Provider>, config: ProviderConfig) {
        let name = provider.name().to_string();
        if !self.providers.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.providers.insert(name.clone(), provider);
        self.configs.insert(name, config);
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(name)
    }

    /// Get provider config
    pub fn get_config(&self, name: &str) -> Option<&ProviderConfig> {
        self.configs.get(name)
    }

    /// All registered provider names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Check if a provider exists
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Effective timeout for a provider, in seconds
    pub fn get_timeout(&self, name: &str, default: f64) -> f64 {
        self.configs
            .get(name)
            .and_then(|c| c.timeout)
            .or_else(|| self.providers.get(name).map(|p| p.timeout()))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::duckduckgo::DuckDuckGo;

    #[test]
    fn test_registry() {
        let mut registry = ProviderRegistry::new();
        let config = ProviderConfig {
            name: "duckduckgo".to_string(),
            provider: "duckduckgo".to_string(),
            ..Default::default()
        };

        registry.register(Arc::new(DuckDuckGo::new()), config);

        assert!(registry.contains("duckduckgo"));
        assert_eq!(registry.names(), vec!["duckduckgo"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_timeout_fallback() {
        let mut registry = ProviderRegistry::new();
        let config = ProviderConfig {
            name: "duckduckgo".to_string(),
            provider: "duckduckgo".to_string(),
            timeout: Some(3.0),
            ..Default::default()
        };
        registry.register(Arc::new(DuckDuckGo::new()), config);

        assert_eq!(registry.get_timeout("duckduckgo", 10.0), 3.0);
        assert_eq!(registry.get_timeout("missing", 10.0), 10.0);
    }
}
