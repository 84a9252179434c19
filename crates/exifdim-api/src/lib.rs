//! exifdim API Library
//!
//! This crate provides the HTTP handlers, middleware, and application setup
//! for the EXIF dimension rewrite service.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use state::AppState;
