//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console output on stderr, leaving stdout to commands
//! - JSON log files with rotation (tracing-appender)
//! - `RUST_LOG` filtering on top of the configured level

pub mod logger;

pub use logger::LoggerImpl;
