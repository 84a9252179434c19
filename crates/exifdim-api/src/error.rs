//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Domain errors from the
//! processing crate and multipart failures convert into `AppError` and render
//! as a plain-text body with the status code from `ErrorMetadata`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use exifdim_core::{AppError, ErrorMetadata, LogLevel};
use exifdim_processing::{RewriteError, ValidationError};

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from exifdim-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::InvalidInput(err.to_string()))
    }
}

impl From<RewriteError> for HttpAppError {
    fn from(err: RewriteError) -> Self {
        match err {
            RewriteError::Validation(validation) => validation.into(),
            RewriteError::Encoding(msg) => HttpAppError(AppError::ImageProcessing(msg)),
            // Keeps the JoinError as the source so the panic shows up in the error log
            RewriteError::Task(join_err) => anyhow::Error::new(join_err).into(),
        }
    }
}

/// Body-limit overruns surface while streaming fields; everything else is a malformed body.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        multipart_failure(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        multipart_failure(rejection.status(), rejection.body_text())
    }
}

fn multipart_failure(status: StatusCode, body_text: String) -> HttpAppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        HttpAppError(AppError::PayloadTooLarge(body_text))
    } else {
        HttpAppError(AppError::InvalidInput(format!(
            "invalid multipart body: {}",
            body_text
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, error_code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, error_code, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                details = %error.detailed_message(),
                error_type,
                error_code,
                "Request failed"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            app_error.client_message(),
        )
            .into_response()
    }
}
