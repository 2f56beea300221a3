//! CLI command implementations.

pub mod classify;
pub mod steps;
pub mod validate;
