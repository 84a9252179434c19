use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use exifdim_core::AppError;
use exifdim_processing::{parse_dimensions, UploadRequest, ValidationError};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::download::attachment_disposition;

/// Multipart form accepted by the rewrite endpoint
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)] // Only describes the form in the OpenAPI document
pub struct RewriteUpload {
    /// Value written to PixelXDimension
    #[schema(example = "3000")]
    width: String,
    /// Value written to PixelYDimension
    #[schema(example = "2000")]
    height: String,
    /// Download name; a non-JPEG extension is replaced by `.jpg`
    #[serde(rename = "outName")]
    #[schema(example = "out.jpg")]
    out_name: Option<String>,
    /// Image to rewrite (JPEG, PNG, WebP or GIF)
    #[schema(value_type = String, format = Binary)]
    picture: Vec<u8>,
}

/// Raw form values as received
#[derive(Debug, Default)]
struct RewriteForm {
    width: Option<String>,
    height: Option<String>,
    out_name: Option<String>,
    picture: Option<Bytes>,
}

async fn read_form(mut multipart: Multipart) -> Result<RewriteForm, HttpAppError> {
    let mut form = RewriteForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "picture" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                if form.picture.is_none() {
                    tracing::debug!(file_name = ?file_name, size = data.len(), "Received picture");
                    form.picture = Some(data);
                } else {
                    tracing::debug!("Ignoring repeated picture field");
                }
            }
            "width" => form.width = Some(field.text().await?),
            "height" => form.height = Some(field.text().await?),
            "outName" => form.out_name = Some(field.text().await?),
            _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Rewrite EXIF pixel dimensions
///
/// Writes `width`/`height` into the EXIF PixelXDimension/PixelYDimension tags
/// of the uploaded picture and returns it as an attachment. Non-JPEG input is
/// transcoded to JPEG first; the pixels themselves are never resized.
///
/// # Errors
/// - `400` - missing picture, non-numeric or non-positive dimensions, undecodable image
/// - `401` - `x-api-key` missing or wrong when an API key is configured
/// - `413` - body exceeds the upload limit
/// - `500` - encoding or metadata serialization failure
#[utoipa::path(
    post,
    path = "/api/rewrite",
    tag = "rewrite",
    request_body(content = RewriteUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Rewritten JPEG sent as an attachment"),
        (status = 400, description = "Invalid form data", content_type = "text/plain", body = String),
        (status = 401, description = "Missing or invalid API key", content_type = "text/plain", body = String),
        (status = 405, description = "Method other than POST", content_type = "text/plain", body = String),
        (status = 413, description = "Upload too large", content_type = "text/plain", body = String),
        (status = 500, description = "Processing failure", content_type = "text/plain", body = String)
    ),
    security(
        (),
        ("api_key" = [])
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "rewrite_dimensions"))]
pub async fn rewrite_dimensions(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let form = read_form(multipart?).await?;

    let picture = form.picture.ok_or(ValidationError::MissingFile)?;
    let (width, height) = parse_dimensions(form.width.as_deref(), form.height.as_deref())?;

    let input_size = picture.len();
    let artifact = state
        .rewriter
        .rewrite_blocking(UploadRequest {
            image_bytes: picture,
            width,
            height,
            out_name: form.out_name,
        })
        .await?;

    tracing::info!(
        width,
        height,
        input_size,
        output_size = artifact.bytes.len(),
        file_name = %artifact.file_name,
        "Dimensions rewritten"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&artifact.file_name),
        )
        .body(Body::from(artifact.bytes))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError(AppError::Internal(e.to_string()))
        })
}

/// Any method other than POST on the rewrite path
pub async fn method_not_allowed() -> Response {
    let mut response =
        HttpAppError(AppError::MethodNotAllowed("Use POST".to_string())).into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("POST"));
    response
}
