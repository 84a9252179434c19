//! Dimension rewriter
//!
//! Takes one uploaded image and two integers and produces a JPEG whose Exif
//! group declares `PixelXDimension`/`PixelYDimension` with those values. The
//! pixel data itself is never resized.

use bytes::Bytes;
use exif::{In, Tag};

use crate::error::RewriteError;
use crate::filename::normalize_output_name;
use crate::jpeg;
use crate::metadata::ExifContainer;
use crate::validator::{validate_file_size, ValidationError};

/// JPEG quality used when the upload has to be transcoded
pub const TRANSCODE_QUALITY: u8 = 95;

/// One rewrite request
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub image_bytes: Bytes,
    pub width: u32,
    pub height: u32,
    /// Requested download name, normalized before use
    pub out_name: Option<String>,
}

/// Result of a rewrite, handed straight to the HTTP response
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub bytes: Bytes,
    pub mime_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct DimensionRewriter {
    mime_type: String,
    quality: u8,
}

impl DimensionRewriter {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            quality: TRANSCODE_QUALITY,
        }
    }

    /// Write `width`/`height` into the image's EXIF metadata.
    ///
    /// Every other existing field is carried over unchanged. Missing or broken
    /// metadata on the input is replaced by an empty container.
    pub fn rewrite(&self, request: UploadRequest) -> Result<OutputArtifact, RewriteError> {
        let UploadRequest {
            image_bytes,
            width,
            height,
            out_name,
        } = request;

        if width == 0 || height == 0 {
            return Err(ValidationError::InvalidDimensions.into());
        }
        validate_file_size(image_bytes.len())?;

        let file_name = normalize_output_name(out_name.as_deref());
        let input_size = image_bytes.len();

        let normalized = jpeg::ensure_jpeg(image_bytes, self.quality)?;
        let mut jpeg_file = jpeg::parse_jpeg(normalized.bytes)?;

        let mut container = ExifContainer::from_jpeg(&jpeg_file);
        let preserved_fields = container.len();
        container.set_u32(Tag::PixelXDimension, In::PRIMARY, width);
        container.set_u32(Tag::PixelYDimension, In::PRIMARY, height);

        let tiff = container.to_tiff_bytes()?;
        jpeg::splice_exif(&mut jpeg_file, &tiff)?;
        let bytes = jpeg::encode(jpeg_file);

        tracing::debug!(
            width,
            height,
            source_format = ?normalized.source_format,
            transcoded = normalized.transcoded,
            preserved_fields,
            input_size,
            output_size = bytes.len(),
            file_name = %file_name,
            "Rewrote EXIF pixel dimensions"
        );

        Ok(OutputArtifact {
            bytes,
            mime_type: self.mime_type.clone(),
            file_name,
        })
    }

    /// Run [`rewrite`](Self::rewrite) on the blocking pool.
    ///
    /// Decoding and encoding are CPU-bound and must not stall the async workers.
    pub async fn rewrite_blocking(
        &self,
        request: UploadRequest,
    ) -> Result<OutputArtifact, RewriteError> {
        let rewriter = self.clone();
        tokio::task::spawn_blocking(move || rewriter.rewrite(request)).await?
    }
}
