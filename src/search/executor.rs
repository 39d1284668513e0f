//! Concurrent fan-out across search providers

use super::models::SearchQuery;
use crate::metrics::Metrics;
use crate::network::HttpClient;
use crate::providers::{Provider, ProviderRegistry, RequestParams};
use crate::results::{FanOutResponse, ProviderError, ProviderFailure, SearchResult, Timing};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// What a single provider task produced
struct ProviderOutcome {
    provider: String,
    results: Vec<SearchResult>,
    failure: Option<ProviderError>,
    elapsed: Duration,
}

/// Fan-out executor that dispatches one query to multiple providers
/// concurrently and joins their independent result lists.
pub struct FanOut {
    /// HTTP client for making requests
    client: HttpClient,
    /// Provider registry
    registry: Arc<ProviderRegistry>,
    /// Default per-provider timeout
    default_timeout: Duration,
    /// Maximum per-provider timeout
    max_timeout: Duration,
    /// Optional metrics sink
    metrics: Option<Arc<Metrics>>,
}

impl FanOut {
    /// Create a new fan-out executor
    pub fn new(client: HttpClient, registry: Arc<ProviderRegistry>) -> Self {
        Self {
            client,
            registry,
            default_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT),
            max_timeout: Duration::from_secs(crate::MAX_TIMEOUT),
            metrics: None,
        }
    }

    /// Set default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set maximum timeout
    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = timeout;
        self
    }

    /// Attach a metrics sink
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Execute a query across the selected providers.
    ///
    /// `providers_used` reports every provider that was attempted, whether or
    /// not it succeeded. A provider failure never aborts the others; its
    /// contribution is an empty list plus a `failures` entry.
    pub async fn search(&self, query: &SearchQuery) -> FanOutResponse {
        // Attempted provider names: the explicit request list as given, or
        // every configured provider.
        let attempted: Vec<String> = match &query.providers {
            Some(requested) => requested.clone(),
            None => self.registry.names().iter().map(|s| s.to_string()).collect(),
        };

        if attempted.is_empty() {
            debug!("No search providers selected, returning empty result set");
            return FanOutResponse::default();
        }

        if let Some(metrics) = &self.metrics {
            metrics.inc_search();
        }

        let futures: Vec<_> = attempted
            .iter()
            .filter_map(|name| {
                let provider = self.registry.get(name)?;
                Some(self.search_provider(provider.clone(), name.clone(), query))
            })
            .collect();

        info!(
            "Fanning out query '{}' to {} providers",
            query.text,
            futures.len()
        );

        let outcomes = join_all(futures).await;

        let mut combined = Vec::new();
        let mut failures = Vec::new();
        let mut timings = Vec::new();

        for outcome in outcomes {
            timings.push(Timing {
                provider: outcome.provider.clone(),
                time_ms: outcome.elapsed.as_millis() as u64,
                result_count: outcome.results.len(),
            });
            if let Some(error) = outcome.failure {
                failures.push(ProviderFailure {
                    provider: outcome.provider,
                    error,
                });
            }
            combined.extend(outcome.results);
        }

        let unique = dedup_by_url(combined);
        let total_results = unique.len();

        // Headroom proportional to the number of attempted providers; the
        // caller applies its own display limit on top.
        let limit = query.max_results * attempted.len();
        let mut results = unique;
        results.truncate(limit);

        FanOutResponse {
            results,
            providers_used: attempted,
            total_results,
            failures,
            timings,
        }
    }

    /// Search a single provider, isolating every failure
    async fn search_provider(
        &self,
        provider: Arc<dyn Provider>,
        name: String,
        query: &SearchQuery,
    ) -> ProviderOutcome {
        let start = Instant::now();

        let provider_timeout = Duration::from_secs_f64(
            query
                .timeout_limit
                .unwrap_or_else(|| {
                    self.registry
                        .get_timeout(&name, self.default_timeout.as_secs_f64())
                })
                .min(self.max_timeout.as_secs_f64()),
        );

        debug!(
            "Searching provider {} with timeout {:?}",
            name, provider_timeout
        );

        let params = RequestParams::new(query.text.clone()).with_max_results(query.max_results);

        let request = match provider.request(&params) {
            Ok(req) => req,
            Err(e) => {
                warn!("Failed to build request for {}: {}", name, e);
                return self.failed(name, ProviderError::Unknown, start);
            }
        };

        let result = timeout(
            provider_timeout,
            self.client.execute_with_timeout(request, provider_timeout),
        )
        .await;

        match result {
            Ok(Ok(response)) => match provider.response(response) {
                Ok(mut results) => {
                    results.truncate(query.max_results);
                    let elapsed = start.elapsed();
                    debug!(
                        "Provider {} returned {} results in {:?}",
                        name,
                        results.len(),
                        elapsed
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_provider_search(&name);
                        metrics.record_response_time(&name, elapsed.as_millis() as u64);
                        metrics.record_success(&name);
                    }
                    ProviderOutcome {
                        provider: name,
                        results,
                        failure: None,
                        elapsed,
                    }
                }
                Err(e) => {
                    warn!("Failed to parse response from {}: {}", name, e);
                    self.failed(name, ProviderError::ParseError, start)
                }
            },
            Ok(Err(e)) => {
                warn!("Request failed for {}: {}", name, e);
                let error = if e.to_string().contains("timeout") {
                    ProviderError::Timeout
                } else if e.to_string().contains("429") {
                    ProviderError::TooManyRequests
                } else if e.to_string().contains("403") {
                    ProviderError::AccessDenied
                } else {
                    ProviderError::NetworkError
                };
                self.failed(name, error, start)
            }
            Err(_) => {
                warn!("Timeout for provider {}", name);
                self.failed(name, ProviderError::Timeout, start)
            }
        }
    }

    fn failed(&self, name: String, error: ProviderError, start: Instant) -> ProviderOutcome {
        if let Some(metrics) = &self.metrics {
            metrics.record_provider_search(&name);
            metrics.record_error(&name);
        }
        ProviderOutcome {
            provider: name,
            results: Vec::new(),
            failure: Some(error),
            elapsed: start.elapsed(),
        }
    }
}

/// Deduplicate results by URL, keeping the first occurrence.
///
/// Results with an empty URL (knowledge base, AI summaries) are never
/// deduplicated against each other.
pub fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(results.len());

    for result in results {
        if result.url.is_empty() {
            unique.push(result);
        } else if seen.insert(result.url.clone()) {
            unique.push(result);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, source: &str) -> SearchResult {
        SearchResult::new("Title", url, "snippet", source)
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let results = vec![
            result("https://example.com", "Google"),
            result("https://example.com", "DuckDuckGo"),
            result("https://other.com", "DuckDuckGo"),
        ];

        let unique = dedup_by_url(results);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].source, "Google");
    }

    #[test]
    fn test_dedup_ignores_empty_urls() {
        let results = vec![
            result("", "Tavily AI"),
            result("", "KnowledgeBase"),
            result("https://example.com", "Tavily"),
        ];

        let unique = dedup_by_url(results);
        assert_eq!(unique.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_registry_short_circuits() {
        let client = HttpClient::new().unwrap();
        let registry = Arc::new(ProviderRegistry::new());
        let fan_out = FanOut::new(client, registry);

        let response = fan_out.search(&SearchQuery::simple("test")).await;

        assert!(response.results.is_empty());
        assert!(response.providers_used.is_empty());
        assert_eq!(response.total_results, 0);
    }

    #[tokio::test]
    async fn test_unknown_requested_provider_makes_no_calls() {
        let client = HttpClient::new().unwrap();
        let registry = Arc::new(ProviderRegistry::new());
        let fan_out = FanOut::new(client, registry);

        let query =
            SearchQuery::simple("test").with_providers(vec!["nonexistent".to_string()]);
        let response = fan_out.search(&query).await;

        // The requested name is reported as attempted even though no adapter
        // exists for it; no results can come back.
        assert_eq!(response.providers_used, vec!["nonexistent".to_string()]);
        assert!(response.results.is_empty());
    }
}
