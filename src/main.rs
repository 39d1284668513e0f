//! RagMix: a multi-provider web search and RAG result-mixing service
//!
//! This is the main entry point for the application.

use anyhow::Result;
use ragmix::{
    config::Settings,
    embedding::{Embedder, HashEmbedder},
    knowledge::{MemoryIndex, QdrantIndex, VectorIndex},
    network::HttpClient,
    providers::ProviderLoader,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting RagMix v{}", ragmix::VERSION);

    // Load configuration
    let settings = load_settings()?;
    info!(
        "Loaded configuration for instance: {}",
        settings.general.instance_name
    );

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;

    // Load providers
    let registry = ProviderLoader::load(&settings)?;

    // Shared embedder and vector index
    let embedder = build_embedder(&settings);
    let index = build_index(&settings, embedder.dimension()).await;

    // Create application state
    let state = AppState::new(settings.clone(), registry, client, index, embedder);

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load settings from file or use defaults
fn load_settings() -> Result<Settings> {
    let paths = [
        PathBuf::from("ragmix.yml"),
        PathBuf::from("config/ragmix.yml"),
        PathBuf::from("/etc/ragmix/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("ragmix/settings.yml"))
            .unwrap_or_default(),
    ];

    // Check environment variable first
    if let Ok(path) = std::env::var("RAGMIX_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Select the embedder from configuration
fn build_embedder(settings: &Settings) -> Arc<dyn Embedder> {
    match settings.knowledge.embedder.as_str() {
        #[cfg(feature = "fastembed")]
        "fastembed" => Arc::new(ragmix::embedding::FastEmbedder::new()),
        #[cfg(not(feature = "fastembed"))]
        "fastembed" => {
            warn!("fastembed support not compiled in, using hash embedder");
            Arc::new(HashEmbedder::new())
        }
        "hash" => Arc::new(HashEmbedder::new()),
        other => {
            warn!("Unknown embedder kind '{}', using hash embedder", other);
            Arc::new(HashEmbedder::new())
        }
    }
}

/// Connect the vector index, falling back to the in-process one
async fn build_index(settings: &Settings, dimension: usize) -> Arc<dyn VectorIndex> {
    if let Some(url) = &settings.knowledge.qdrant_url {
        match QdrantIndex::connect(
            url,
            settings.knowledge.collection.clone(),
            dimension as u64,
        )
        .await
        {
            Ok(index) => {
                info!("Connected to Qdrant at {}", url);
                return Arc::new(index);
            }
            Err(e) => {
                warn!("Qdrant unavailable ({}), falling back to in-memory index", e);
            }
        }
    }

    info!("Using in-memory vector index");
    Arc::new(MemoryIndex::new())
}
