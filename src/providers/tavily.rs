//! Tavily search provider
//!
//! REST API tuned for LLM consumers. When the response includes an
//! AI-generated answer it is emitted as a rank-0 result with no URL; URL
//! deduplication leaves such results alone.

use super::traits::*;
use crate::results::SearchResult;
use anyhow::Result as AnyhowResult;

/// Tavily search provider
pub struct Tavily {
    api_url: String,
    api_key: String,
}

impl Tavily {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.tavily.com/search".to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the endpoint URL (used by tests against a local stub)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl Provider for Tavily {
    fn name(&self) -> &str {
        "tavily"
    }

    fn source(&self) -> &str {
        "Tavily"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    fn timeout(&self) -> f64 {
        15.0
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<ProviderRequest> {
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": params.query,
            "max_results": params.max_results,
            "search_depth": "advanced",
            "include_answer": true,
            "include_raw_content": false,
        });

        Ok(ProviderRequest::post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(body))
    }

    fn response(&self, response: ProviderResponse) -> AnyhowResult<Vec<SearchResult>> {
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status));
        }

        let json: serde_json::Value = response.json()?;
        let mut results = Vec::new();

        // AI answer first, as a URL-less summary result
        if let Some(answer) = json.get("answer").and_then(|a| a.as_str()) {
            if !answer.is_empty() {
                results.push(
                    SearchResult::new("AI Summary", "", answer, "Tavily AI").with_rank(0),
                );
            }
        }

        let items = json
            .get("results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        for (idx, item) in items.iter().enumerate() {
            let title = item
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            let url = item.get("url").and_then(|u| u.as_str()).unwrap_or_default();
            let snippet = item
                .get("content")
                .and_then(|c| c.as_str())
                .unwrap_or_default();

            let mut result = SearchResult::new(title, url, snippet, self.source())
                .with_rank((idx + 1) as u32);
            if let Some(score) = item.get("score").and_then(|s| s.as_f64()) {
                result = result.with_score(score as f32);
            }
            results.push(result);
        }

        Ok(results)
    }
}
