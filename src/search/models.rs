//! Search query data model

use serde::{Deserialize, Serialize};

/// Complete search query with all parameters.
///
/// Created per call, fully owned by the call, discarded after the response
/// is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search query string
    pub text: String,
    /// Maximum results requested per source
    pub max_results: usize,
    /// Explicit provider selection; `None` means all enabled providers
    pub providers: Option<Vec<String>>,
    /// Whether to re-score web results with embedding similarity
    pub use_rag: bool,
    /// Whether to mix knowledge-base documents into the result set
    pub mix_with_documents: bool,
    /// Custom per-provider timeout in seconds
    pub timeout_limit: Option<f64>,
}

impl SearchQuery {
    /// Create a simple query for a single string
    pub fn simple(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_results: 5,
            providers: None,
            use_rag: true,
            mix_with_documents: true,
            timeout_limit: None,
        }
    }

    /// Set the per-source result cap
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Restrict the query to specific providers
    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Enable or disable RAG re-scoring
    pub fn with_rag(mut self, use_rag: bool) -> Self {
        self.use_rag = use_rag;
        self
    }

    /// Enable or disable document mixing
    pub fn with_document_mixing(mut self, mix: bool) -> Self {
        self.mix_with_documents = mix;
        self
    }

    /// Set a custom provider timeout
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_limit = Some(seconds);
        self
    }

    /// Get effective timeout, bounded by the configured maximum
    pub fn effective_timeout(&self, default: f64, max: f64) -> f64 {
        self.timeout_limit.map(|t| t.min(max)).unwrap_or(default)
    }

    /// Check if query is empty
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_query() {
        let query = SearchQuery::simple("hello world");
        assert_eq!(query.text, "hello world");
        assert_eq!(query.max_results, 5);
        assert!(query.use_rag);
        assert!(query.mix_with_documents);
    }

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::simple("test")
            .with_max_results(3)
            .with_providers(vec!["duckduckgo".to_string()])
            .with_rag(false);

        assert_eq!(query.max_results, 3);
        assert_eq!(query.providers.as_deref().unwrap().len(), 1);
        assert!(!query.use_rag);
    }

    #[test]
    fn test_effective_timeout_is_capped() {
        let query = SearchQuery::simple("test").with_timeout(60.0);
        assert_eq!(query.effective_timeout(10.0, 30.0), 30.0);
        assert_eq!(SearchQuery::simple("x").effective_timeout(10.0, 30.0), 10.0);
    }
}
