//! Route configuration and setup

use crate::constants::{OPENAPI_PATH, REQUEST_ID_HEADER, REWRITE_PATH};
use crate::handlers;
use crate::middleware::{
    api_key_middleware, request_id_middleware, security_headers_middleware, ApiKeyState,
    RequestId, SecurityHeadersConfig,
};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use exifdim_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Allowance for multipart boundaries and the small text fields on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_key_state = Arc::new(ApiKeyState {
        api_key: config.api_key().map(str::to_string),
    });
    if api_key_state.api_key.is_some() {
        tracing::info!("API key required for {}", REWRITE_PATH);
    }

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    let body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let http_concurrency_limit = config.http_concurrency_limit().max(1);
    let request_timeout = Duration::from_secs(config.request_timeout_secs());
    tracing::info!(
        body_limit,
        http_concurrency_limit,
        request_timeout_secs = request_timeout.as_secs(),
        "HTTP limits configured"
    );

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id
        )
    });

    let app = Router::new()
        .merge(public_routes())
        .merge(rewrite_routes(api_key_state))
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        // Multipart maps an overrun of this limit to 413 while streaming fields
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let exposed = [
        header::CONTENT_DISPOSITION,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(exposed)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(exposed)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::liveness_check))
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// The rewrite endpoint: POST only, optionally behind the shared API key.
///
/// The key check is a route layer, so other methods get `405` without it.
fn rewrite_routes(api_key_state: Arc<ApiKeyState>) -> Router<Arc<AppState>> {
    Router::new().route(
        REWRITE_PATH,
        post(handlers::rewrite::rewrite_dimensions)
            .route_layer(axum::middleware::from_fn_with_state(
                api_key_state,
                api_key_middleware,
            ))
            .fallback(handlers::rewrite::method_not_allowed),
    )
}
