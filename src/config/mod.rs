//! Configuration module for RagMix
//!
//! Handles loading and validating settings from YAML files and environment
//! variables. Settings are constructed once at startup and passed into the
//! components that need them; there is no ambient global state.

mod settings;

pub use settings::*;
