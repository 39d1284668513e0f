//! Settings structures for RagMix configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching ragmix.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub providers: Vec<ProviderConfig>,
    pub knowledge: KnowledgeSettings,
    pub cache: CacheSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            search: SearchSettings::default(),
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            providers: default_providers(),
            knowledge: KnowledgeSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables.
    ///
    /// Provider credentials follow the platform convention: the presence of a
    /// key enables the provider, its absence silently disables it.
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("RAGMIX_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("RAGMIX_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("RAGMIX_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("QDRANT_URL") {
            self.knowledge.qdrant_url = Some(val);
        }

        if let Ok(key) = std::env::var("GOOGLE_SEARCH_API_KEY") {
            if let Some(p) = self.provider_mut("google") {
                p.api_key = Some(key);
            }
        }
        if let Ok(id) = std::env::var("GOOGLE_SEARCH_ENGINE_ID") {
            if let Some(p) = self.provider_mut("google") {
                p.engine_id = Some(id);
            }
        }
        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            if let Some(p) = self.provider_mut("tavily") {
                p.api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("SERPAPI_API_KEY") {
            if let Some(p) = self.provider_mut("serpapi") {
                p.api_key = Some(key);
            }
        }
    }

    /// Get provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    fn provider_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        self.providers.iter_mut().find(|p| p.name == name)
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug mode
    pub debug: bool,
    /// Instance name reported by /health
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "RagMix".to_string(),
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default number of results per provider
    pub default_num_results: usize,
    /// Override for the mixer's truncation multiplier.
    ///
    /// When unset, the mixer keeps `num_results * contributing_source_kinds`
    /// results (the headroom doubling when web and documents both feed in).
    pub mix_overfetch: Option<usize>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_num_results: 5,
            mix_overfetch: None,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Maximum request timeout
    pub max_request_timeout: Option<f64>,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            max_request_timeout: Some(30.0),
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Individual provider configuration.
///
/// Built once at startup; enablement is derived from credential presence and
/// never changes for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (unique identifier)
    pub name: String,
    /// Adapter kind to instantiate
    pub provider: String,
    /// Whether the provider is explicitly disabled
    pub disabled: bool,
    /// Custom timeout for this provider (seconds)
    pub timeout: Option<f64>,
    /// API key, if the provider requires one
    pub api_key: Option<String>,
    /// Secondary credential (Google custom search engine id)
    pub engine_id: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: String::new(),
            disabled: false,
            timeout: None,
            api_key: None,
            engine_id: None,
        }
    }
}

/// Knowledge-base settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// Qdrant URL; unset means the in-process index is used
    pub qdrant_url: Option<String>,
    /// Vector collection name
    pub collection: String,
    /// Minimum similarity score for semantic matches
    pub score_threshold: f32,
    /// Embedder kind: "hash" or "fastembed"
    pub embedder: String,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            qdrant_url: None,
            collection: "documents".to_string(),
            score_threshold: 0.5,
            embedder: "hash".to_string(),
        }
    }
}

/// Cache settings for the knowledge-base text search path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entry time-to-live in seconds
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_capacity: 10_000,
        }
    }
}

/// Default provider configurations
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "duckduckgo".to_string(),
            provider: "duckduckgo".to_string(),
            ..Default::default()
        },
        ProviderConfig {
            name: "google".to_string(),
            provider: "google".to_string(),
            ..Default::default()
        },
        ProviderConfig {
            name: "tavily".to_string(),
            provider: "tavily".to_string(),
            timeout: Some(15.0),
            ..Default::default()
        },
        ProviderConfig {
            name: "serpapi".to_string(),
            provider: "serpapi".to_string(),
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert!(!settings.general.debug);
        assert_eq!(settings.providers.len(), 4);
        assert_eq!(settings.knowledge.collection, "documents");
    }

    #[test]
    fn test_provider_lookup() {
        let settings = Settings::default();
        let tavily = settings.get_provider("tavily");
        assert!(tavily.is_some());
        assert_eq!(tavily.unwrap().timeout, Some(15.0));
    }
}
