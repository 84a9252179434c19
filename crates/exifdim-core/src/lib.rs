//! exifdim Core Library
//!
//! This crate provides the configuration and error types shared by the
//! processing and api crates.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{BaseConfig, Config, LogFormat, RewriteConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
