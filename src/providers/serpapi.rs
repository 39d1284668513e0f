//! SerpAPI search provider
//!
//! Google results through the SerpAPI aggregator.

use super::traits::*;
use crate::results::SearchResult;
use anyhow::Result as AnyhowResult;

/// SerpAPI search provider
pub struct SerpApi {
    api_url: String,
    api_key: String,
}

impl SerpApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: "https://serpapi.com/search.json".to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the endpoint URL (used by tests against a local stub)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl Provider for SerpApi {
    fn name(&self) -> &str {
        "serpapi"
    }

    fn source(&self) -> &str {
        "Google (SerpAPI)"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<ProviderRequest> {
        Ok(ProviderRequest::get(&self.api_url)
            .param("engine", "google")
            .param("q", &params.query)
            .param("num", params.max_results.to_string())
            .param("api_key", &self.api_key))
    }

    fn response(&self, response: ProviderResponse) -> AnyhowResult<Vec<SearchResult>> {
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status));
        }

        let json: serde_json::Value = response.json()?;

        let items = json
            .get("organic_results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        let mut results = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            let title = item
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            let url = item
                .get("link")
                .and_then(|l| l.as_str())
                .unwrap_or_default();
            let snippet = item
                .get("snippet")
                .and_then(|s| s.as_str())
                .unwrap_or_default();

            results.push(
                SearchResult::new(title, url, snippet, self.source())
                    .with_rank((idx + 1) as u32),
            );
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serpapi_request() {
        let serpapi = SerpApi::new("sp-key");
        let params = RequestParams::new("metasearch");
        let request = serpapi.request(&params).unwrap();

        assert!(request.url.contains("serpapi.com"));
        assert_eq!(request.params.get("engine").unwrap(), "google");
        assert_eq!(request.params.get("api_key").unwrap(), "sp-key");
    }

    #[test]
    fn test_serpapi_response() {
        let body = serde_json::json!({
            "organic_results": [
                {"title": "One", "link": "https://example.com/1", "snippet": "first"},
                {"title": "Two", "link": "https://example.com/2", "snippet": "second"}
            ]
        });
        let response = ProviderResponse {
            status: 200,
            headers: Default::default(),
            text: body.to_string(),
            url: String::new(),
        };

        let serpapi = SerpApi::new("sp-key");
        let results = serpapi.response(response).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[0].source, "Google (SerpAPI)");
    }
}
