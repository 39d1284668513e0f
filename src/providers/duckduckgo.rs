//! DuckDuckGo search provider
//!
//! Scrapes the HTML endpoint; the only provider that works without an API
//! key, so it is always enabled.

use super::traits::*;
use crate::results::SearchResult;
use anyhow::Result as AnyhowResult;
use scraper::{Html, Selector};
use std::collections::HashMap;

/// DuckDuckGo web search provider
pub struct DuckDuckGo {
    html_url: String,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self {
            html_url: "https://html.duckduckgo.com/html/".to_string(),
        }
    }

    /// Override the endpoint URL (used by tests against a local stub)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.html_url = url.into();
        self
    }

    /// Resolve DuckDuckGo redirect links ("//duckduckgo.com/l/?uddg=<url>")
    /// to the target URL.
    fn resolve_url(href: &str) -> Option<String> {
        if href.contains("duckduckgo.com/l/") {
            let full = if href.starts_with("//") {
                format!("https:{}", href)
            } else {
                href.to_string()
            };
            let parsed = url::Url::parse(&full).ok()?;
            let target = parsed
                .query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())?;
            return Some(target);
        }
        if href.contains("duckduckgo.com") || href.starts_with('/') {
            return None;
        }
        Some(href.to_string())
    }

    fn parse_results(&self, html: &str, max_results: usize) -> Vec<SearchResult> {
        let document = Html::parse_document(html);
        let mut results = Vec::new();

        let result_selector = Selector::parse("div.result").unwrap();
        let title_selector = Selector::parse("a.result__a").unwrap();
        let snippet_selector = Selector::parse("a.result__snippet").unwrap();

        let mut rank = 1u32;

        for element in document.select(&result_selector) {
            if results.len() >= max_results {
                break;
            }

            let title_elem = match element.select(&title_selector).next() {
                Some(t) => t,
                None => continue,
            };

            let title = title_elem.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }

            let url = match title_elem.value().attr("href").and_then(Self::resolve_url) {
                Some(u) => u,
                None => continue,
            };

            let snippet = element
                .select(&snippet_selector)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            results.push(
                SearchResult::new(title, url, snippet, self.source()).with_rank(rank),
            );
            rank += 1;
        }

        results
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn source(&self) -> &str {
        "DuckDuckGo"
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<ProviderRequest> {
        let mut form_data = HashMap::new();
        form_data.insert("q".to_string(), params.query.clone());
        form_data.insert("b".to_string(), String::new());

        Ok(ProviderRequest::post(&self.html_url).form(form_data))
    }

    fn response(&self, response: ProviderResponse) -> AnyhowResult<Vec<SearchResult>> {
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status));
        }

        // max_results is re-applied by the parse cap below; the HTML endpoint
        // has no result-count parameter.
        Ok(self.parse_results(&response.text, 30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duckduckgo_request() {
        let ddg = DuckDuckGo::new();
        let params = RequestParams::new("rust programming");
        let request = ddg.request(&params).unwrap();

        assert!(request.url.contains("duckduckgo.com"));
        assert_eq!(request.method, HttpMethod::Post);
    }

    #[test]
    fn test_parse_html_results() {
        let html = r#"
            <div class="result">
              <a class="result__a" href="https://example.com/one">First result</a>
              <a class="result__snippet">Snippet one</a>
            </div>
            <div class="result">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Ftwo&rut=abc">Second result</a>
              <a class="result__snippet">Snippet two</a>
            </div>
        "#;

        let ddg = DuckDuckGo::new();
        let results = ddg.parse_results(html, 10);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://example.com/one");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].url, "https://example.com/two");
        assert_eq!(results[1].source, "DuckDuckGo");
    }

    #[test]
    fn test_internal_links_skipped() {
        let html = r#"
            <div class="result">
              <a class="result__a" href="/settings">Settings</a>
              <a class="result__snippet">Not a result</a>
            </div>
        "#;

        let ddg = DuckDuckGo::new();
        assert!(ddg.parse_results(html, 10).is_empty());
    }
}
