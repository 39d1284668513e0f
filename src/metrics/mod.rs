//! Metrics collection module
//!
//! Tracks provider performance, error rates, and usage statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// In-process metrics collector
pub struct Metrics {
    /// Total search count
    pub total_searches: AtomicU64,
    /// Searches per provider
    provider_searches: RwLock<HashMap<String, u64>>,
    /// Provider response times (rolling window in ms)
    provider_response_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Provider error counts
    provider_errors: RwLock<HashMap<String, u64>>,
    /// Provider success counts
    provider_successes: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            provider_searches: RwLock::new(HashMap::new()),
            provider_response_times: RwLock::new(HashMap::new()),
            provider_errors: RwLock::new(HashMap::new()),
            provider_successes: RwLock::new(HashMap::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a provider search
    pub fn record_provider_search(&self, provider: &str) {
        let mut searches = self.provider_searches.write().unwrap();
        *searches.entry(provider.to_string()).or_insert(0) += 1;
    }

    /// Record provider response time
    pub fn record_response_time(&self, provider: &str, time_ms: u64) {
        let mut times = self.provider_response_times.write().unwrap();
        let entry = times.entry(provider.to_string()).or_insert_with(Vec::new);

        // Keep last 100 response times
        if entry.len() >= 100 {
            entry.remove(0);
        }
        entry.push(time_ms);
    }

    /// Record provider error
    pub fn record_error(&self, provider: &str) {
        let mut errors = self.provider_errors.write().unwrap();
        *errors.entry(provider.to_string()).or_insert(0) += 1;
    }

    /// Record provider success
    pub fn record_success(&self, provider: &str) {
        let mut successes = self.provider_successes.write().unwrap();
        *successes.entry(provider.to_string()).or_insert(0) += 1;
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average response time for a provider
    pub fn get_avg_response_time(&self, provider: &str) -> Option<u64> {
        let times = self.provider_response_times.read().unwrap();
        times.get(provider).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    /// Get reliability percentage for a provider
    pub fn get_reliability(&self, provider: &str) -> f64 {
        let errors = self.provider_errors.read().unwrap();
        let successes = self.provider_successes.read().unwrap();

        let error_count = *errors.get(provider).unwrap_or(&0);
        let success_count = *successes.get(provider).unwrap_or(&0);

        let total = error_count + success_count;
        if total == 0 {
            100.0
        } else {
            (success_count as f64 / total as f64) * 100.0
        }
    }

    /// Get all provider statistics
    pub fn get_provider_stats(&self) -> HashMap<String, ProviderStats> {
        let searches = self.provider_searches.read().unwrap();
        let mut stats = HashMap::new();

        for provider in searches.keys() {
            stats.insert(
                provider.clone(),
                ProviderStats {
                    searches: *searches.get(provider).unwrap_or(&0),
                    avg_response_time: self.get_avg_response_time(provider),
                    reliability: self.get_reliability(provider),
                },
            );
        }

        stats
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single provider
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderStats {
    pub searches: u64,
    pub avg_response_time: Option<u64>,
    pub reliability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.inc_search();
        metrics.record_provider_search("duckduckgo");
        metrics.record_response_time("duckduckgo", 100);
        metrics.record_success("duckduckgo");

        assert_eq!(metrics.get_total_searches(), 1);
        assert_eq!(metrics.get_avg_response_time("duckduckgo"), Some(100));
        assert_eq!(metrics.get_reliability("duckduckgo"), 100.0);
    }

    #[test]
    fn test_reliability_mixes_errors() {
        let metrics = Metrics::new();
        metrics.record_success("tavily");
        metrics.record_error("tavily");

        assert_eq!(metrics.get_reliability("tavily"), 50.0);
    }
}
