//! Search orchestration module
//!
//! Coordinates concurrent search execution across providers and merges their
//! independent result lists.

mod executor;
mod models;

pub use executor::{dedup_by_url, FanOut};
pub use models::SearchQuery;
