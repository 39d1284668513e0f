//! Web server module
//!
//! Provides the HTTP JSON API for RagMix.

mod handlers;
mod routes;
mod state;

pub use handlers::{SearchRequest, SearchResponse};
pub use routes::create_router;
pub use state::AppState;
