//! Result types for search results
//!
//! This module defines the core result structures used throughout the service.

mod types;

pub use types::*;
