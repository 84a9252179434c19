use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use exifdim_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::constants::API_KEY_HEADER;
use crate::error::HttpAppError;

/// Expected shared key; `None` disables the check
#[derive(Clone, Debug)]
pub struct ApiKeyState {
    pub api_key: Option<String>,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn api_key_middleware(
    State(auth_state): State<Arc<ApiKeyState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth_state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if secure_compare(key, expected) => next.run(request).await,
        Some(_) => {
            tracing::warn!("Rejected request with invalid API key");
            HttpAppError(AppError::Unauthorized("unauthorized".to_string())).into_response()
        }
        None => {
            tracing::warn!("Rejected request without API key");
            HttpAppError(AppError::Unauthorized("unauthorized".to_string())).into_response()
        }
    }
}
