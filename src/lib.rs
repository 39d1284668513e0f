//! RagMix: a multi-provider web search and RAG result-mixing service
//!
//! Fans queries out to external search providers concurrently, merges the
//! results with a semantic search over a persisted knowledge base, and
//! returns a deduplicated, ranked result list.

pub mod cache;
pub mod config;
pub mod embedding;
pub mod knowledge;
pub mod metrics;
pub mod mixer;
pub mod network;
pub mod providers;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use mixer::Mixer;
pub use providers::Provider;
pub use results::{FanOutResponse, MixedResultSet, SearchResult};
pub use search::{FanOut, SearchQuery};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for provider requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 10;

/// Maximum timeout that can be set
pub const MAX_TIMEOUT: u64 = 30;
