//! API constants

/// Path of the dimension rewrite endpoint
pub const REWRITE_PATH: &str = "/api/rewrite";

/// Path the OpenAPI document is served from
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Header carrying the optional shared API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Service version reported by `/health` and the OpenAPI document
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
