//! Application state shared by all handlers.

use exifdim_core::Config;
use exifdim_processing::DimensionRewriter;

/// Immutable per-process state, shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub rewriter: DimensionRewriter,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let rewriter = DimensionRewriter::new(config.download_content_type());
        Self { config, rewriter }
    }
}
