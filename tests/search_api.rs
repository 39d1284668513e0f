//! End-to-end tests for the search API with stubbed providers

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ragmix::config::{ProviderConfig, Settings};
use ragmix::embedding::HashEmbedder;
use ragmix::knowledge::MemoryIndex;
use ragmix::network::HttpClient;
use ragmix::providers::{google::Google, serpapi::SerpApi, ProviderRegistry};
use ragmix::web::{create_router, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_config(name: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        provider: name.to_string(),
        api_key: Some("test-key".to_string()),
        engine_id: Some("test-cx".to_string()),
        ..Default::default()
    }
}

/// Build a router whose google/serpapi adapters point at the mock server
fn build_app(mock_uri: &str) -> axum::Router {
    let mut registry = ProviderRegistry::new();
    registry.register(
        Arc::new(Google::new("test-key", "test-cx").with_base_url(format!("{}/google", mock_uri))),
        provider_config("google"),
    );
    registry.register(
        Arc::new(SerpApi::new("test-key").with_base_url(format!("{}/serpapi", mock_uri))),
        provider_config("serpapi"),
    );

    let state = AppState::new(
        Settings::default(),
        registry,
        HttpClient::new().unwrap(),
        Arc::new(MemoryIndex::new()),
        Arc::new(HashEmbedder::new()),
    );

    create_router(state)
}

fn google_body(urls: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "items": urls.iter().enumerate().map(|(i, url)| serde_json::json!({
            "title": format!("Google result {}", i + 1),
            "link": url,
            "snippet": format!("snippet {}", i + 1),
        })).collect::<Vec<_>>()
    })
}

fn serpapi_body(urls: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "organic_results": urls.iter().enumerate().map(|(i, url)| serde_json::json!({
            "title": format!("SerpAPI result {}", i + 1),
            "link": url,
            "snippet": format!("snippet {}", i + 1),
        })).collect::<Vec<_>>()
    })
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn end_to_end_two_providers_without_rag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body(&[
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/serpapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serpapi_body(&[
            "https://example.com/d",
            "https://example.com/e",
            "https://example.com/f",
        ])))
        .mount(&server)
        .await;

    let app = build_app(&server.uri());

    let (status, body) = post_json(
        &app,
        "/search",
        serde_json::json!({
            "query": "AI trends",
            "num_results": 6,
            "use_rag": false,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 6);
    assert_eq!(body["web_results_count"], 6);
    assert_eq!(body["document_results_count"], 0);
    assert_eq!(body["rag_enabled"], false);

    let providers: Vec<&str> = body["providers_used"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(providers.contains(&"google"));
    assert!(providers.contains(&"serpapi"));

    // search_time is a 2-decimal seconds string
    let search_time = body["search_time"].as_str().unwrap();
    assert!(search_time.parse::<f64>().is_ok());
    assert_eq!(search_time.split('.').nth(1).unwrap().len(), 2);
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn one_failing_provider_does_not_break_the_others() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/google"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/serpapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serpapi_body(&[
            "https://example.com/x",
            "https://example.com/y",
        ])))
        .mount(&server)
        .await;

    let app = build_app(&server.uri());

    let (status, body) = post_json(
        &app,
        "/search",
        serde_json::json!({
            "query": "resilience",
            "use_rag": false,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["web_results_count"], 2);

    // Attempted providers are reported even when one failed
    let providers = body["providers_used"].as_array().unwrap();
    assert_eq!(providers.len(), 2);

    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["source"], "Google (SerpAPI)");
    }
}

#[tokio::test]
async fn duplicate_urls_across_providers_are_merged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/google"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(google_body(&["https://example.com/shared"])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/serpapi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serpapi_body(&["https://example.com/shared"])),
        )
        .mount(&server)
        .await;

    let app = build_app(&server.uri());

    let (status, body) = post_json(
        &app,
        "/search",
        serde_json::json!({
            "query": "dedup",
            "use_rag": false,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 1);
    // First-seen wins: google is invoked before serpapi
    assert_eq!(body["results"][0]["source"], "Google");
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let server = MockServer::start().await;
    let app = build_app(&server.uri());

    let (status, body) = post_json(&app, "/search", serde_json::json!({ "query": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn rag_mixing_includes_knowledge_base_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/google"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(google_body(&["https://example.com/web"])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/serpapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serpapi_body(&[])))
        .mount(&server)
        .await;

    let app = build_app(&server.uri());

    // Ingest a document whose content matches the query closely enough to
    // clear the similarity threshold
    let (status, ingested) = post_json(
        &app,
        "/documents",
        serde_json::json!({
            "title": "Platform notes",
            "content": "enterprise rag platform",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ingested["chunks_count"], 1);

    let (status, body) = post_json(
        &app,
        "/search",
        serde_json::json!({
            "query": "enterprise rag platform",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rag_enabled"], true);
    assert_eq!(body["mixed_with_documents"], true);
    assert_eq!(body["document_results_count"], 1);

    let results = body["results"].as_array().unwrap();
    let kb_result = results
        .iter()
        .find(|r| r["source"] == "KnowledgeBase")
        .expect("knowledge-base result missing");
    assert_eq!(kb_result["type"], "document");
    assert!(kb_result["url"].as_str().unwrap().is_empty());

    let web_result = results
        .iter()
        .find(|r| r["source"] == "Google")
        .expect("web result missing");
    assert_eq!(web_result["type"], "web");
}

#[tokio::test]
async fn requested_provider_subset_is_honored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/google"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(google_body(&["https://example.com/g"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/serpapi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serpapi_body(&["https://example.com/s"])),
        )
        .expect(0)
        .mount(&server)
        .await;

    let app = build_app(&server.uri());

    let (status, body) = post_json(
        &app,
        "/search",
        serde_json::json!({
            "query": "subset",
            "use_rag": false,
            "providers": ["google"],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers_used"], serde_json::json!(["google"]));
    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["source"], "Google");
    }
}
