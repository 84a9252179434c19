//! Test helpers: build the router and an in-process test server.
//!
//! Run from workspace root: `cargo test -p exifdim-api`.

pub mod fixtures;

use axum_test::TestServer;
use exifdim_api::setup::routes;
use exifdim_api::AppState;
use exifdim_core::Config;
use std::sync::Arc;

/// API key used by tests that enable key checking
pub const TEST_API_KEY: &str = "test-api-key-0123456789";

/// Default configuration, independent of the process environment.
pub fn test_config() -> Config {
    Config::default()
}

/// Configuration that requires `TEST_API_KEY`.
pub fn test_config_with_api_key() -> Config {
    let mut config = Config::default();
    config.rewrite.api_key = Some(TEST_API_KEY.to_string());
    config
}

/// Build a test server around the full router, middleware included.
pub fn setup_test_server(config: Config) -> TestServer {
    let state = Arc::new(AppState::new(config.clone()));
    let router = routes::setup_routes(&config, state).expect("router should build");
    TestServer::new(router).expect("test server should start")
}
