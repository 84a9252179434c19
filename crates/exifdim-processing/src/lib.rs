//! exifdim Processing Library
//!
//! This crate implements the dimension rewriter: input validation, JPEG
//! normalization, the EXIF metadata container and segment splicing.

pub mod error;
pub mod filename;
pub mod jpeg;
pub mod metadata;
pub mod rewriter;
pub mod validator;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::RewriteError;
pub use filename::{normalize_output_name, DEFAULT_OUTPUT_NAME};
pub use metadata::{ExifContainer, ExifError, MetadataGroup};
pub use rewriter::{DimensionRewriter, OutputArtifact, UploadRequest, TRANSCODE_QUALITY};
pub use validator::{parse_dimensions, ValidationError};
