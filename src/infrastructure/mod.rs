//! Infrastructure layer module
//!
//! - Configuration management (settings and the actions file)
//! - Logging infrastructure
//!
//! The Bugzilla and Jira clients are supplied by the embedding service
//! through the domain ports.

pub mod config;
pub mod logging;
