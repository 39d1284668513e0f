//! Google Custom Search provider
//!
//! Uses the official Custom Search JSON API; requires an API key and a
//! search engine id.

use super::traits::*;
use crate::results::SearchResult;
use anyhow::Result as AnyhowResult;

/// Google Custom Search provider
pub struct Google {
    api_url: String,
    api_key: String,
    engine_id: String,
}

impl Google {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }

    /// Override the endpoint URL (used by tests against a local stub)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl Provider for Google {
    fn name(&self) -> &str {
        "google"
    }

    fn source(&self) -> &str {
        "Google"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<ProviderRequest> {
        // The API returns at most 10 results per request.
        let num = params.max_results.min(10);

        Ok(ProviderRequest::get(&self.api_url)
            .param("key", &self.api_key)
            .param("cx", &self.engine_id)
            .param("q", &params.query)
            .param("num", num.to_string()))
    }

    fn response(&self, response: ProviderResponse) -> AnyhowResult<Vec<SearchResult>> {
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status));
        }

        let json: serde_json::Value = response.json()?;

        let items = json
            .get("items")
            .and_then(|i| i.as_array())
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
    fn test_google_request() {
        let google = Google::new("key", "cx-id");
        let params = RequestParams::new("rust programming").with_max_results(20);
        let request = google.request(&params).unwrap();

        assert!(request.url.contains("googleapis.com"));
        assert_eq!(request.params.get("cx").unwrap(), "cx-id");
        assert_eq!(request.params.get("num").unwrap(), "10");
    }

    #[test]
    fn test_google_response() {
        let body = serde_json::json!({
            "items": [
                {"title": "One", "link": "https://example.com/1", "snippet": "first"},
                {"title": "Two", "link": "https://example.com/2"}
            ]
        });
        let response = ProviderResponse {
            status: 200,
            headers: Default::default(),
            text: body.to_string(),
            url: String::new(),
        };

        let google = Google::new("key", "cx-id");
        let results = google.response(response).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[1].source, "Google");
    }
}
