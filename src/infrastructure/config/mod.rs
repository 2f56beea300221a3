//! Configuration management infrastructure
//!
//! Hierarchical settings using figment:
//! - YAML file loading
//! - Environment variable overrides (`JBI_` prefix)
//! - Actions file parsing and validation

pub mod loader;

pub use loader::ConfigLoader;
