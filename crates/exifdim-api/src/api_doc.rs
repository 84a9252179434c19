//! OpenAPI documentation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::{API_KEY_HEADER, SERVICE_VERSION};
use crate::handlers;

/// Returns the OpenAPI document with the running service version filled in.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info.version = SERVICE_VERSION.to_string();
    spec
}

/// Registers the optional `x-api-key` header scheme
struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "exifdim API",
        description = "Rewrites the EXIF PixelXDimension/PixelYDimension tags of an uploaded image and returns it as a JPEG download. Pixels are never resized."
    ),
    paths(
        handlers::rewrite::rewrite_dimensions,
        handlers::health::health_check,
    ),
    components(
        schemas(
            handlers::rewrite::RewriteUpload,
            handlers::health::HealthCheckResponse,
        )
    ),
    modifiers(&ApiKeyAddon),
    tags(
        (name = "rewrite", description = "EXIF dimension rewriting"),
        (name = "health", description = "Service health checks")
    )
)]
pub struct ApiDoc;
