//! Result type definitions

use serde::{Deserialize, Serialize};

/// Neutral relevance score assigned to results that were never scored.
///
/// Ranking treats a missing score as this value rather than zero, so
/// un-scored results sit in the middle of the order instead of at the bottom.
pub const NEUTRAL_SCORE: f32 = 0.5;

/// A single search result from a web provider or the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title
    pub title: String,
    /// Result URL; empty for non-web sources (knowledge base, AI summaries)
    pub url: String,
    /// Content snippet
    pub snippet: String,
    /// Source label ("DuckDuckGo", "Google", "Tavily", "KnowledgeBase", ...)
    pub source: String,
    /// 1-based position within the producing source's own order.
    /// Informational only; ranks are not comparable across sources.
    pub rank: u32,
    /// Relevance score in [0, 1], if the source provided one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Origin tag assigned during mixing
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub origin: Option<ResultOrigin>,
    /// Source document id for knowledge-base results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<i64>,
}

impl SearchResult {
    /// Create a new result
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source: source.into(),
            rank: 0,
            score: None,
            origin: None,
            doc_id: None,
        }
    }

    /// Set the provider-local rank
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    /// Set the relevance score
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the source document id
    pub fn with_doc_id(mut self, doc_id: i64) -> Self {
        self.doc_id = Some(doc_id);
        self
    }

    /// Copy of this result carrying an origin tag.
    ///
    /// Results are never mutated after creation; the mixer tags copies.
    pub fn tagged(&self, origin: ResultOrigin) -> Self {
        let mut tagged = self.clone();
        tagged.origin = Some(origin);
        tagged
    }

    /// Score used for ranking, neutral when absent
    pub fn effective_score(&self) -> f32 {
        self.score.unwrap_or(NEUTRAL_SCORE)
    }
}

/// Where a mixed result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrigin {
    Web,
    Document,
}

/// Combined output of one fan-out call
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOutResponse {
    /// Deduplicated results in provider-invocation, first-seen order
    pub results: Vec<SearchResult>,
    /// Providers that were attempted, successful or not
    pub providers_used: Vec<String>,
    /// Count of unique results before truncation
    pub total_results: usize,
    /// Providers that failed, with the failure kind
    pub failures: Vec<ProviderFailure>,
    /// Per-provider timings
    pub timings: Vec<Timing>,
}

/// Final output of the mixing pipeline
#[derive(Debug, Clone, Serialize)]
pub struct MixedResultSet {
    /// Deduplicated, ranked, truncated results
    pub results: Vec<SearchResult>,
    /// Providers attempted by the fan-out stage
    pub providers_used: Vec<String>,
    /// Number of web results in `results`
    pub web_count: usize,
    /// Number of knowledge-base results in `results`
    pub knowledge_count: usize,
    /// Whether RAG re-scoring ran
    pub rag_enabled: bool,
    /// Whether knowledge-base documents were mixed in
    pub mixed_with_documents: bool,
}

/// Provider failure classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderError {
    Timeout,
    NetworkError,
    HttpError(u16),
    ParseError,
    MissingCredentials,
    TooManyRequests,
    AccessDenied,
    Unknown,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "Request timed out"),
            Self::NetworkError => write!(f, "Network error"),
            Self::HttpError(code) => write!(f, "HTTP error: {}", code),
            Self::ParseError => write!(f, "Failed to parse response"),
            Self::MissingCredentials => write!(f, "Missing credentials"),
            Self::TooManyRequests => write!(f, "Too many requests"),
            Self::AccessDenied => write!(f, "Access denied"),
            Self::Unknown => write!(f, "Unknown error"),
        }
    }
}

/// A provider that failed during fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

/// Provider response timing information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timing {
    /// Provider name
    pub provider: String,
    /// Response time in milliseconds
    pub time_ms: u64,
    /// Number of results returned
    pub result_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_copy_leaves_original_untouched() {
        let result = SearchResult::new("Title", "https://example.com", "snippet", "Google")
            .with_rank(1)
            .with_score(0.9);

        let tagged = result.tagged(ResultOrigin::Web);

        assert_eq!(tagged.origin, Some(ResultOrigin::Web));
        assert!(result.origin.is_none());
        assert_eq!(tagged.score, Some(0.9));
    }

    #[test]
    fn test_effective_score_defaults_to_neutral() {
        let result = SearchResult::new("Title", "", "snippet", "KnowledgeBase");
        assert_eq!(result.effective_score(), NEUTRAL_SCORE);
        assert_eq!(result.with_score(0.9).effective_score(), 0.9);
    }
}
